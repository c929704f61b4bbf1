//! Box-box contact generation: separating-axis test over the fifteen
//! candidate axes, then incident-face clipping for face contacts or a
//! closest-point query for edge-edge contacts.

use crate::collision::{Contact, SurfaceParams};
use crate::math::{Transform, Vector3, EPSILON};
use crate::shapes::BoxShape;

/// Edge axes must beat the best face axis by this margin before an
/// edge-edge contact is preferred; face contacts are more stable.
const EDGE_BIAS: f32 = 0.95;

struct OrientedBox {
    center: Vector3,
    axes: [Vector3; 3],
    half: [f32; 3],
}

impl OrientedBox {
    fn new(shape: &BoxShape, pose: &Transform) -> Self {
        let m = pose.rotation.to_rotation_matrix();
        let axis = |j: usize| Vector3::new(m.data[0][j], m.data[1][j], m.data[2][j]);
        Self {
            center: pose.position,
            axes: [axis(0), axis(1), axis(2)],
            half: [
                shape.half_extents.x,
                shape.half_extents.y,
                shape.half_extents.z,
            ],
        }
    }

    /// Projection radius onto a unit axis
    fn radius_on(&self, axis: &Vector3) -> f32 {
        self.axes[0].dot(axis).abs() * self.half[0]
            + self.axes[1].dot(axis).abs() * self.half[1]
            + self.axes[2].dot(axis).abs() * self.half[2]
    }

    /// The four corners of the face on axis `i` with the given sign
    fn face_vertices(&self, i: usize, sign: f32) -> [Vector3; 4] {
        let j = (i + 1) % 3;
        let k = (i + 2) % 3;
        let face_center = self.center + self.axes[i] * (sign * self.half[i]);
        let u = self.axes[j] * self.half[j];
        let v = self.axes[k] * self.half[k];
        [
            face_center + u + v,
            face_center + u - v,
            face_center - u - v,
            face_center - u + v,
        ]
    }
}

enum Feature {
    FaceA(usize),
    FaceB(usize),
    Edge(usize, usize),
}

pub(crate) fn collide(
    a: &BoxShape,
    pa: &Transform,
    b: &BoxShape,
    pb: &Transform,
) -> Vec<Contact> {
    let box_a = OrientedBox::new(a, pa);
    let box_b = OrientedBox::new(b, pb);
    let d = box_b.center - box_a.center;

    let mut best_depth = f32::INFINITY;
    let mut best_axis = Vector3::zero();
    let mut best_feature = Feature::FaceA(0);

    // Face axes of both boxes
    for i in 0..3 {
        let axis = box_a.axes[i];
        let depth = box_a.radius_on(&axis) + box_b.radius_on(&axis) - d.dot(&axis).abs();
        if depth < 0.0 {
            return Vec::new();
        }
        if depth < best_depth {
            best_depth = depth;
            best_axis = axis;
            best_feature = Feature::FaceA(i);
        }
    }
    for i in 0..3 {
        let axis = box_b.axes[i];
        let depth = box_a.radius_on(&axis) + box_b.radius_on(&axis) - d.dot(&axis).abs();
        if depth < 0.0 {
            return Vec::new();
        }
        if depth < best_depth {
            best_depth = depth;
            best_axis = axis;
            best_feature = Feature::FaceB(i);
        }
    }

    // Edge cross axes
    for i in 0..3 {
        for j in 0..3 {
            let cross = box_a.axes[i].cross(&box_b.axes[j]);
            let length = cross.length();
            if length < EPSILON {
                continue; // near-parallel edges
            }
            let axis = cross / length;
            let depth = box_a.radius_on(&axis) + box_b.radius_on(&axis) - d.dot(&axis).abs();
            if depth < 0.0 {
                return Vec::new();
            }
            if depth < best_depth * EDGE_BIAS {
                best_depth = depth;
                best_axis = axis;
                best_feature = Feature::Edge(i, j);
            }
        }
    }

    // Orient the contact normal from B toward A
    let normal = if d.dot(&best_axis) > 0.0 {
        -best_axis
    } else {
        best_axis
    };

    match best_feature {
        Feature::FaceA(i) => face_contacts(&box_a, i, &box_b, normal, false),
        Feature::FaceB(i) => face_contacts(&box_b, i, &box_a, normal, true),
        Feature::Edge(i, j) => edge_contact(&box_a, i, &box_b, j, normal, best_depth),
    }
}

/// Clips the incident face of one box against the reference face of the
/// other and keeps points at or behind the reference surface.
///
/// `reference_is_b` says whether the reference box is the second geom;
/// the contact normal is the same either way, but the reference face
/// points along the opposite direction when the roles swap.
fn face_contacts(
    reference: &OrientedBox,
    ref_axis: usize,
    incident: &OrientedBox,
    normal: Vector3,
    reference_is_b: bool,
) -> Vec<Contact> {
    // Outward normal of the reference face: toward the incident box.
    // The contact normal points from B toward A, so the reference face
    // of A faces along -normal and the reference face of B along +normal.
    let outward = if reference_is_b { normal } else { -normal };
    let ref_sign = if reference.axes[ref_axis].dot(&outward) >= 0.0 {
        1.0
    } else {
        -1.0
    };
    let ref_normal = reference.axes[ref_axis] * ref_sign;

    // Incident face: the one most anti-parallel to the reference normal
    let mut inc_axis = 0;
    let mut inc_alignment = incident.axes[0].dot(&ref_normal);
    for i in 1..3 {
        let alignment = incident.axes[i].dot(&ref_normal);
        if alignment.abs() > inc_alignment.abs() {
            inc_axis = i;
            inc_alignment = alignment;
        }
    }
    let inc_sign = if inc_alignment >= 0.0 { -1.0 } else { 1.0 };

    let mut polygon: Vec<Vector3> = incident.face_vertices(inc_axis, inc_sign).to_vec();

    // Clip against the four side planes of the reference face
    let j = (ref_axis + 1) % 3;
    let k = (ref_axis + 2) % 3;
    for side in [j, k] {
        let axis = reference.axes[side];
        let center_proj = reference.center.dot(&axis);
        polygon = clip_half_space(&polygon, axis, center_proj + reference.half[side]);
        polygon = clip_half_space(&polygon, -axis, -(center_proj - reference.half[side]));
    }

    let face_offset = reference.center.dot(&ref_normal) + reference.half[ref_axis];
    let mut contacts = Vec::new();
    for point in polygon {
        let separation = point.dot(&ref_normal) - face_offset;
        if separation <= 0.0 {
            contacts.push(Contact {
                position: point,
                normal,
                depth: -separation,
                surface: SurfaceParams::default(),
            });
        }
    }
    contacts
}

/// Keeps the part of the polygon with `dot(p, axis) <= offset`
fn clip_half_space(polygon: &[Vector3], axis: Vector3, offset: f32) -> Vec<Vector3> {
    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (index, &current) in polygon.iter().enumerate() {
        let next = polygon[(index + 1) % polygon.len()];
        let d_current = current.dot(&axis) - offset;
        let d_next = next.dot(&axis) - offset;

        if d_current <= 0.0 {
            out.push(current);
        }
        if (d_current > 0.0) != (d_next > 0.0) && (d_current - d_next).abs() > EPSILON {
            let t = d_current / (d_current - d_next);
            out.push(current + (next - current) * t);
        }
    }
    out
}

/// Single contact at the closest points of the two supporting edges
fn edge_contact(
    box_a: &OrientedBox,
    edge_a: usize,
    box_b: &OrientedBox,
    edge_b: usize,
    normal: Vector3,
    depth: f32,
) -> Vec<Contact> {
    // Supporting edge on A: the edge along axes[edge_a] at the corner
    // extreme in the direction of B (opposite the contact normal)
    let mut point_a = box_a.center;
    for k in 0..3 {
        if k != edge_a {
            let sign = if box_a.axes[k].dot(&normal) < 0.0 { 1.0 } else { -1.0 };
            point_a += box_a.axes[k] * (sign * box_a.half[k]);
        }
    }
    let mut point_b = box_b.center;
    for k in 0..3 {
        if k != edge_b {
            let sign = if box_b.axes[k].dot(&normal) > 0.0 { 1.0 } else { -1.0 };
            point_b += box_b.axes[k] * (sign * box_b.half[k]);
        }
    }

    let dir_a = box_a.axes[edge_a];
    let dir_b = box_b.axes[edge_b];
    let w = point_a - point_b;
    let dot_ab = dir_a.dot(&dir_b);
    let denom = 1.0 - dot_ab * dot_ab;

    let (s, t) = if denom.abs() > EPSILON {
        let wa = w.dot(&dir_a);
        let wb = w.dot(&dir_b);
        let s = (dot_ab * wb - wa) / denom;
        (s, dot_ab * s + wb)
    } else {
        (0.0, 0.0)
    };

    let closest_a = point_a + dir_a * s.clamp(-box_a.half[edge_a], box_a.half[edge_a]);
    let closest_b = point_b + dir_b * t.clamp(-box_b.half[edge_b], box_b.half[edge_b]);

    vec![Contact {
        position: (closest_a + closest_b) * 0.5,
        normal,
        depth,
        surface: SurfaceParams::default(),
    }]
}
