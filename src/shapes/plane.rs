use crate::error::PhysicsError;
use crate::math::{Aabb, Vector3};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// An infinite static plane defined by `normal . p = offset`.
///
/// The half-space below the plane (against the normal) is solid, so the
/// normal points out of the surface. Planes cannot be attached to bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Plane {
    /// Unit normal pointing out of the solid half-space
    pub normal: Vector3,

    /// Distance of the plane from the origin along the normal
    pub offset: f32,
}

impl Plane {
    /// Creates a plane from its equation coefficients `a x + b y + c z = d`.
    ///
    /// The normal is renormalized; a degenerate normal is an error.
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Result<Self> {
        let normal = Vector3::new(a, b, c);
        if !normal.is_finite() || !d.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "plane coefficients must be finite, got ({a}, {b}, {c}, {d})"
            )));
        }
        let length = normal.length();
        if length < crate::math::EPSILON {
            return Err(PhysicsError::InvalidParameter(
                "plane normal must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            normal: normal / length,
            offset: d / length,
        })
    }

    /// Returns the signed distance of a point above the plane surface
    #[inline]
    pub fn signed_distance(&self, point: Vector3) -> f32 {
        self.normal.dot(&point) - self.offset
    }

    /// Planes extend without bound, so their bounds cover all of space
    pub fn bounds(&self) -> Aabb {
        Aabb::infinite()
    }
}
