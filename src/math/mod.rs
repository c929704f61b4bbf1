pub mod vector;
pub mod matrix;
pub mod rotation;
pub mod transform;
pub mod aabb;

pub use self::vector::{Vector2, Vector3};
pub use self::matrix::Matrix3;
pub use self::rotation::Quaternion;
pub use self::transform::Transform;
pub use self::aabb::Aabb;

/// Small value used for floating point comparisons
pub const EPSILON: f32 = 1e-6;
