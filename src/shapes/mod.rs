mod box_shape;
mod mesh;
mod plane;
mod shape;
mod sphere;

pub use self::box_shape::BoxShape;
pub use self::mesh::{TriMesh, TriMeshData, Triangle};
pub use self::plane::Plane;
pub use self::shape::Shape;
pub use self::sphere::Sphere;
