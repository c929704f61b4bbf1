use crate::error::PhysicsError;
use crate::math::Matrix3;
use crate::Result;

/// Mass and inertia of a rigid body, computed from a primitive shape
#[derive(Debug, Clone, Copy)]
pub struct MassProperties {
    /// Total mass
    pub mass: f32,

    /// Inertia tensor about the center of mass, in the body frame
    pub inertia: Matrix3,
}

impl MassProperties {
    /// Mass properties of a solid box with the given side lengths and density
    pub fn box_sides(density: f32, lx: f32, ly: f32, lz: f32) -> Self {
        let mass = density * lx * ly * lz;
        let k = mass / 12.0;
        Self {
            mass,
            inertia: Matrix3::from_diagonal(
                k * (ly * ly + lz * lz),
                k * (lx * lx + lz * lz),
                k * (lx * lx + ly * ly),
            ),
        }
    }

    /// Mass properties of a solid sphere with the given density and radius
    pub fn sphere(density: f32, radius: f32) -> Self {
        let mass = density * (4.0 / 3.0) * std::f32::consts::PI * radius.powi(3);
        let i = 0.4 * mass * radius * radius;
        Self {
            mass,
            inertia: Matrix3::from_diagonal(i, i, i),
        }
    }

    /// Rescales the properties so the total mass equals the given value,
    /// preserving the inertia distribution
    pub fn adjusted(&self, total_mass: f32) -> Result<Self> {
        if !(total_mass.is_finite() && total_mass > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "adjusted mass must be finite and positive, got {total_mass}"
            )));
        }
        let scale = total_mass / self.mass;
        Ok(Self {
            mass: total_mass,
            inertia: self.inertia * scale,
        })
    }
}
