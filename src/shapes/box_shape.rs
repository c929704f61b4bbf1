use crate::error::PhysicsError;
use crate::math::{Aabb, Transform, Vector3};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A solid rectangular box centered on the body origin
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BoxShape {
    /// Half the side length along each local axis
    pub half_extents: Vector3,
}

impl BoxShape {
    /// Creates a box from its full side lengths
    pub fn new(lx: f32, ly: f32, lz: f32) -> Result<Self> {
        if !(lx.is_finite() && ly.is_finite() && lz.is_finite())
            || lx <= 0.0
            || ly <= 0.0
            || lz <= 0.0
        {
            return Err(PhysicsError::InvalidParameter(format!(
                "box side lengths must be finite and positive, got ({lx}, {ly}, {lz})"
            )));
        }
        Ok(Self {
            half_extents: Vector3::new(lx * 0.5, ly * 0.5, lz * 0.5),
        })
    }

    /// Returns the full side lengths of the box
    pub fn sides(&self) -> Vector3 {
        self.half_extents * 2.0
    }

    /// Returns the volume of the box
    pub fn volume(&self) -> f32 {
        let s = self.sides();
        s.x * s.y * s.z
    }

    /// Returns the eight corners of the box in world space
    pub fn corners(&self, pose: &Transform) -> [Vector3; 8] {
        let h = self.half_extents;
        let mut out = [Vector3::zero(); 8];
        for (i, corner) in out.iter_mut().enumerate() {
            let local = Vector3::new(
                if i & 1 == 0 { -h.x } else { h.x },
                if i & 2 == 0 { -h.y } else { h.y },
                if i & 4 == 0 { -h.z } else { h.z },
            );
            *corner = pose.transform_point(local);
        }
        out
    }

    /// Returns the box bounds in its local frame
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(Vector3::zero(), self.half_extents)
    }

    /// Returns the box bounds under the given pose
    pub fn world_bounds(&self, pose: &Transform) -> Aabb {
        // The rotated box fits in an AABB whose half extent on each world
        // axis is the sum of |R| rows times the local half extents.
        let rotation = pose.rotation.to_rotation_matrix();
        let h = self.half_extents;
        let extent = Vector3::new(
            rotation.data[0][0].abs() * h.x
                + rotation.data[0][1].abs() * h.y
                + rotation.data[0][2].abs() * h.z,
            rotation.data[1][0].abs() * h.x
                + rotation.data[1][1].abs() * h.y
                + rotation.data[1][2].abs() * h.z,
            rotation.data[2][0].abs() * h.x
                + rotation.data[2][1].abs() * h.y
                + rotation.data[2][2].abs() * h.z,
        );
        Aabb::from_center_half_extents(pose.position, extent)
    }
}
