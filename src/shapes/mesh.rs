use crate::error::PhysicsError;
use crate::math::{Aabb, Transform, Vector3};
use crate::Result;
use std::sync::Arc;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Immutable triangle mesh data shared between geoms.
///
/// Vertices are stored in the mesh's local frame; a geom using the mesh
/// positions it with its own pose. The data is validated on construction
/// so collision code can index it without bounds failures.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TriMeshData {
    vertices: Vec<Vector3>,
    triangles: Vec<[u32; 3]>,
}

impl TriMeshData {
    /// Builds mesh data from flat vertex and index buffers.
    ///
    /// `vertices` holds xyz triples and `indices` holds vertex-index
    /// triples, one per triangle. Out-of-range indices, truncated buffers
    /// and non-finite coordinates are rejected.
    pub fn from_buffers(vertices: &[f32], indices: &[u32]) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "vertex buffer length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }

        let vertex_count = vertices.len() / 3;
        let points: Vec<Vector3> = vertices
            .chunks_exact(3)
            .map(|v| Vector3::new(v[0], v[1], v[2]))
            .collect();
        if points.iter().any(|p| !p.is_finite()) {
            return Err(PhysicsError::InvalidParameter(
                "mesh vertices must be finite".to_string(),
            ));
        }

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for tri in indices.chunks_exact(3) {
            for &index in tri {
                if index as usize >= vertex_count {
                    return Err(PhysicsError::InvalidParameter(format!(
                        "triangle index {index} out of range ({vertex_count} vertices)"
                    )));
                }
            }
            triangles.push([tri[0], tri[1], tri[2]]);
        }

        Ok(Self {
            vertices: points,
            triangles,
        })
    }

    /// Returns the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the triangle at the given index, in the mesh's local frame
    pub fn triangle(&self, index: usize) -> Triangle {
        let [a, b, c] = self.triangles[index];
        Triangle {
            a: self.vertices[a as usize],
            b: self.vertices[b as usize],
            c: self.vertices[c as usize],
        }
    }

    /// Returns the mesh bounds in its local frame
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
            .unwrap_or_else(|| Aabb::new(Vector3::zero(), Vector3::zero()))
    }
}

/// A triangle mesh shape, sharing its data with other geoms
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TriMesh {
    /// Shared mesh data
    pub data: Arc<TriMeshData>,
}

impl TriMesh {
    /// Creates a mesh shape from shared data
    pub fn new(data: Arc<TriMeshData>) -> Self {
        Self { data }
    }

    /// Returns the mesh bounds under the given pose
    pub fn world_bounds(&self, pose: &Transform) -> Aabb {
        let local = self.data.local_bounds();
        // Transform the eight corners of the local box
        let mut corners = [Vector3::zero(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let local_corner = Vector3::new(
                if i & 1 == 0 { local.min.x } else { local.max.x },
                if i & 2 == 0 { local.min.y } else { local.max.y },
                if i & 4 == 0 { local.min.z } else { local.max.z },
            );
            *corner = pose.transform_point(local_corner);
        }
        Aabb::from_points(&corners).unwrap_or_else(Aabb::infinite)
    }
}

/// A single triangle in world or local space
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub a: Vector3,
    pub b: Vector3,
    pub c: Vector3,
}

impl Triangle {
    /// Returns the triangle under the given pose
    pub fn transformed(&self, pose: &Transform) -> Self {
        Self {
            a: pose.transform_point(self.a),
            b: pose.transform_point(self.b),
            c: pose.transform_point(self.c),
        }
    }

    /// Returns the (unnormalized) face normal
    pub fn normal(&self) -> Vector3 {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    /// Returns the point on the triangle closest to the given point.
    ///
    /// Voronoi-region walk over vertices, edges and face.
    pub fn closest_point(&self, p: Vector3) -> Vector3 {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ap = p - self.a;

        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.a;
        }

        let bp = p - self.b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return self.b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return self.a + ab * v;
        }

        let cp = p - self.c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return self.c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.b + (self.c - self.b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.a + ab * v + ac * w
    }
}
