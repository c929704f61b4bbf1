use crate::math::Vector3;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Global configuration parameters for the physics world
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct WorldConfig {
    /// The gravity acceleration applied to every dynamic body
    pub gravity: Vector3,

    /// Error-reduction parameter: the fraction of constraint violation
    /// corrected per step. Must lie in [0, 1].
    pub erp: f32,

    /// Constraint-force mixing: softening added to the solver diagonal,
    /// trading exactness for stability. Must be >= 0.
    pub cfm: f32,

    /// The number of projected Gauss-Seidel passes per step
    pub solver_iterations: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(0.0, 0.0, -9.8),
            erp: 0.2,
            cfm: 1e-5,
            solver_iterations: 20,
        }
    }
}
