//! Contact generation between shape pairs.
//!
//! The dispatcher matches on the shape pair and flips normals when the
//! pair is handled in swapped order, so every returned contact follows
//! the same convention: the normal points from the second geom toward
//! the first. Pairs with no specialized handler produce no contacts.

use crate::collision::box_box;
use crate::collision::{Contact, Geom, SurfaceParams};
use crate::math::{Transform, Vector3, EPSILON};
use crate::shapes::{BoxShape, Plane, Shape, Sphere, TriMesh};

/// Generates up to `max_contacts` contact points for a geom pair.
///
/// The surface parameters are stamped onto every contact. When a pair
/// produces more points than requested, the deepest ones are kept.
pub fn collide(a: &Geom, b: &Geom, max_contacts: usize, surface: &SurfaceParams) -> Vec<Contact> {
    if max_contacts == 0 {
        return Vec::new();
    }

    let pa = a.pose();
    let pb = b.pose();
    let mut contacts = match (a.shape(), b.shape()) {
        (Shape::Sphere(sa), Shape::Sphere(sb)) => {
            sphere_sphere(sa, pa.position, sb, pb.position)
        }
        (Shape::Sphere(s), Shape::Box(bx)) => sphere_box(s, pa.position, bx, &pb),
        (Shape::Box(bx), Shape::Sphere(s)) => flip(sphere_box(s, pb.position, bx, &pa)),
        (Shape::Sphere(s), Shape::Plane(p)) => sphere_plane(s, pa.position, p),
        (Shape::Plane(p), Shape::Sphere(s)) => flip(sphere_plane(s, pb.position, p)),
        (Shape::Box(bx), Shape::Plane(p)) => box_plane(bx, &pa, p),
        (Shape::Plane(p), Shape::Box(bx)) => flip(box_plane(bx, &pb, p)),
        (Shape::Box(ba), Shape::Box(bb)) => box_box::collide(ba, &pa, bb, &pb),
        (Shape::Sphere(s), Shape::TriMesh(m)) => sphere_trimesh(s, pa.position, m, &pb),
        (Shape::TriMesh(m), Shape::Sphere(s)) => flip(sphere_trimesh(s, pb.position, m, &pa)),
        _ => Vec::new(),
    };

    for contact in &mut contacts {
        contact.surface = *surface;
    }
    truncate(contacts, max_contacts)
}

/// Keeps the `max` deepest contacts, preserving order among equals
fn truncate(mut contacts: Vec<Contact>, max: usize) -> Vec<Contact> {
    if contacts.len() > max {
        contacts.sort_by(|x, y| {
            y.depth
                .partial_cmp(&x.depth)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        contacts.truncate(max);
    }
    contacts
}

fn flip(contacts: Vec<Contact>) -> Vec<Contact> {
    contacts.iter().map(Contact::flipped).collect()
}

fn contact(position: Vector3, normal: Vector3, depth: f32) -> Contact {
    Contact {
        position,
        normal,
        depth,
        surface: SurfaceParams::default(),
    }
}

fn sphere_sphere(sa: &Sphere, ca: Vector3, sb: &Sphere, cb: Vector3) -> Vec<Contact> {
    let delta = ca - cb;
    let dist = delta.length();
    let sum = sa.radius + sb.radius;
    if dist >= sum {
        return Vec::new();
    }

    // Coincident centers have no preferred direction; pick one
    let normal = if dist > EPSILON {
        delta / dist
    } else {
        Vector3::unit_z()
    };
    let position = (ca - normal * sa.radius + cb + normal * sb.radius) * 0.5;
    vec![contact(position, normal, sum - dist)]
}

fn sphere_plane(s: &Sphere, center: Vector3, p: &Plane) -> Vec<Contact> {
    let dist = p.signed_distance(center);
    let depth = s.radius - dist;
    if depth <= 0.0 {
        return Vec::new();
    }
    let position = center - p.normal * s.radius;
    vec![contact(position, p.normal, depth)]
}

fn sphere_box(s: &Sphere, center: Vector3, bx: &BoxShape, box_pose: &Transform) -> Vec<Contact> {
    let h = bx.half_extents;
    let local = box_pose.inverse_transform_point(center);
    let clamped = local.max(&-h).min(&h);
    let delta = local - clamped;
    let dist_sq = delta.length_squared();

    if dist_sq > EPSILON * EPSILON {
        // Center outside the box
        if dist_sq >= s.radius * s.radius {
            return Vec::new();
        }
        let dist = dist_sq.sqrt();
        let normal = box_pose.transform_direction(delta / dist);
        let position = box_pose.transform_point(clamped);
        return vec![contact(position, normal, s.radius - dist)];
    }

    // Center inside the box: push out through the nearest face
    let gaps = [h.x - local.x.abs(), h.y - local.y.abs(), h.z - local.z.abs()];
    let mut axis = 0;
    for i in 1..3 {
        if gaps[i] < gaps[axis] {
            axis = i;
        }
    }
    let sign = if local.component(axis) >= 0.0 { 1.0 } else { -1.0 };
    let mut local_normal = Vector3::zero();
    match axis {
        0 => local_normal.x = sign,
        1 => local_normal.y = sign,
        _ => local_normal.z = sign,
    }
    let normal = box_pose.transform_direction(local_normal);
    vec![contact(center, normal, s.radius + gaps[axis])]
}

fn box_plane(bx: &BoxShape, pose: &Transform, p: &Plane) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for corner in bx.corners(pose) {
        let dist = p.signed_distance(corner);
        if dist <= 0.0 {
            contacts.push(contact(corner, p.normal, -dist));
        }
    }
    contacts
}

fn sphere_trimesh(
    s: &Sphere,
    center: Vector3,
    mesh: &TriMesh,
    mesh_pose: &Transform,
) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for i in 0..mesh.data.triangle_count() {
        let tri = mesh.data.triangle(i).transformed(mesh_pose);
        let closest = tri.closest_point(center);
        let delta = center - closest;
        let dist_sq = delta.length_squared();
        if dist_sq >= s.radius * s.radius {
            continue;
        }

        let dist = dist_sq.sqrt();
        let normal = if dist > EPSILON {
            delta / dist
        } else {
            // Center on the triangle surface: fall back to the face normal
            let face = tri.normal().normalize();
            if face.is_zero() {
                continue;
            }
            face
        };
        contacts.push(contact(closest, normal, s.radius - dist));
    }
    contacts
}
