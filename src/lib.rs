pub mod math;
pub mod core;
pub mod bodies;
pub mod shapes;
pub mod collision;
pub mod constraints;
pub mod sim;

/// Re-export common types for easier usage
pub use crate::core::{World, WorldConfig, BodyHandle, JointHandle, GeomHandle};
pub use crate::bodies::RigidBody;
pub use crate::collision::{Space, SpaceKind, Geom, Contact, SurfaceParams};
pub use crate::constraints::{Joint, JointGroup};
pub use crate::sim::{Simulation, StepSettings, Renderer};
pub use crate::math::Vector3;

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum PhysicsError {
        /// A handle referred to a body, joint, or geom that no longer exists
        #[error("Invalid reference: {0}")]
        InvalidReference(String),

        /// A setter was given a non-finite or otherwise unusable value
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        /// NaN or Inf was detected in body state after a step
        #[error("Numerical instability: {0}")]
        NumericalInstability(String),
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
