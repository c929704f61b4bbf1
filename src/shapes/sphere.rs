use crate::error::PhysicsError;
use crate::math::{Aabb, Transform, Vector3};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A solid sphere centered on the body origin
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Sphere {
    /// Radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a sphere with the given radius
    pub fn new(radius: f32) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "sphere radius must be finite and positive, got {radius}"
            )));
        }
        Ok(Self { radius })
    }

    /// Returns the volume of the sphere
    pub fn volume(&self) -> f32 {
        (4.0 / 3.0) * std::f32::consts::PI * self.radius.powi(3)
    }

    /// Returns the sphere bounds in its local frame
    pub fn local_bounds(&self) -> Aabb {
        let r = Vector3::new(self.radius, self.radius, self.radius);
        Aabb::from_center_half_extents(Vector3::zero(), r)
    }

    /// Returns the sphere bounds under the given pose
    pub fn world_bounds(&self, pose: &Transform) -> Aabb {
        let r = Vector3::new(self.radius, self.radius, self.radius);
        Aabb::from_center_half_extents(pose.position, r)
    }
}
