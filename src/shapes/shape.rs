use crate::bodies::MassProperties;
use crate::math::{Aabb, Transform};
use crate::shapes::{BoxShape, Plane, Sphere, TriMesh};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// The collision shape of a geom.
///
/// A closed enum rather than a trait object: the collision dispatcher
/// matches on shape pairs directly, which keeps pair handling exhaustive
/// and the narrow phase free of dynamic dispatch.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Shape {
    /// A solid rectangular box
    Box(BoxShape),

    /// A solid sphere
    Sphere(Sphere),

    /// An infinite static plane
    Plane(Plane),

    /// A triangle mesh
    TriMesh(TriMesh),
}

impl Shape {
    /// Returns the shape bounds under the given pose.
    ///
    /// Planes report unbounded extents; broad phases must treat them
    /// specially rather than hashing them into cells.
    pub fn world_bounds(&self, pose: &Transform) -> Aabb {
        match self {
            Shape::Box(b) => b.world_bounds(pose),
            Shape::Sphere(s) => s.world_bounds(pose),
            Shape::Plane(p) => p.bounds(),
            Shape::TriMesh(m) => m.world_bounds(pose),
        }
    }

    /// Returns the shape bounds in its local frame
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Shape::Box(b) => b.local_bounds(),
            Shape::Sphere(s) => s.local_bounds(),
            Shape::Plane(p) => p.bounds(),
            Shape::TriMesh(m) => m.data.local_bounds(),
        }
    }

    /// Returns the enclosed volume for solid shapes
    pub fn volume(&self) -> Option<f32> {
        match self {
            Shape::Box(b) => Some(b.volume()),
            Shape::Sphere(s) => Some(s.volume()),
            Shape::Plane(_) | Shape::TriMesh(_) => None,
        }
    }

    /// Computes mass and inertia for solid shapes at the given density
    pub fn mass_properties(&self, density: f32) -> Option<MassProperties> {
        match self {
            Shape::Box(b) => {
                let sides = b.sides();
                Some(MassProperties::box_sides(density, sides.x, sides.y, sides.z))
            }
            Shape::Sphere(s) => Some(MassProperties::sphere(density, s.radius)),
            Shape::Plane(_) | Shape::TriMesh(_) => None,
        }
    }

    /// Returns whether the shape may be attached to a rigid body
    pub fn is_placeable(&self) -> bool {
        !matches!(self, Shape::Plane(_))
    }
}
