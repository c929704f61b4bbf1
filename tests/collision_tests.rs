use approx::assert_relative_eq;
use rigid_engine::collision::collide;
use rigid_engine::math::{Quaternion, Transform, Vector3};
use rigid_engine::shapes::{BoxShape, Plane, Shape, Sphere, TriMesh, TriMeshData};
use rigid_engine::{RigidBody, Space, SpaceKind, SurfaceParams, World};
use std::sync::Arc;

fn sphere(radius: f32) -> Shape {
    Shape::Sphere(Sphere::new(radius).unwrap())
}

fn unit_box() -> Shape {
    Shape::Box(BoxShape::new(1.0, 1.0, 1.0).unwrap())
}

fn ground_plane() -> Shape {
    Shape::Plane(Plane::new(0.0, 0.0, 1.0, 0.0).unwrap())
}

fn at(x: f32, y: f32, z: f32) -> Transform {
    Transform::from_position(Vector3::new(x, y, z))
}

#[test]
fn overlapping_spheres_touch() {
    let mut space = Space::new(SpaceKind::Simple);
    let a = space.add_geom(sphere(1.0), at(0.0, 0.0, 1.5));
    let b = space.add_geom(sphere(1.0), at(0.0, 0.0, 0.0));

    let contacts = collide(
        space.geom(a).unwrap(),
        space.geom(b).unwrap(),
        4,
        &SurfaceParams::default(),
    );
    assert_eq!(contacts.len(), 1);
    assert_relative_eq!(contacts[0].depth, 0.5, epsilon = 1e-5);
    // Normal points from the second geom toward the first
    assert_relative_eq!(contacts[0].normal.z, 1.0, epsilon = 1e-5);
}

#[test]
fn separated_spheres_do_not_touch() {
    let mut space = Space::new(SpaceKind::Simple);
    let a = space.add_geom(sphere(1.0), at(0.0, 0.0, 3.0));
    let b = space.add_geom(sphere(1.0), at(0.0, 0.0, 0.0));

    let contacts = collide(
        space.geom(a).unwrap(),
        space.geom(b).unwrap(),
        4,
        &SurfaceParams::default(),
    );
    assert!(contacts.is_empty());
}

#[test]
fn sphere_against_plane() {
    let mut space = Space::new(SpaceKind::Simple);
    let s = space.add_geom(sphere(0.5), at(2.0, -1.0, 0.3));
    let p = space.add_geom(ground_plane(), Transform::identity());

    let contacts = collide(
        space.geom(s).unwrap(),
        space.geom(p).unwrap(),
        4,
        &SurfaceParams::default(),
    );
    assert_eq!(contacts.len(), 1);
    assert_relative_eq!(contacts[0].depth, 0.2, epsilon = 1e-5);
    assert_relative_eq!(contacts[0].normal.z, 1.0);

    // Swapped order flips the normal
    let flipped = collide(
        space.geom(p).unwrap(),
        space.geom(s).unwrap(),
        4,
        &SurfaceParams::default(),
    );
    assert_eq!(flipped.len(), 1);
    assert_relative_eq!(flipped[0].normal.z, -1.0);
}

#[test]
fn sphere_against_box_face() {
    let mut space = Space::new(SpaceKind::Simple);
    let s = space.add_geom(sphere(0.5), at(0.0, 0.0, 0.9));
    let b = space.add_geom(unit_box(), at(0.0, 0.0, 0.0));

    let contacts = collide(
        space.geom(s).unwrap(),
        space.geom(b).unwrap(),
        4,
        &SurfaceParams::default(),
    );
    assert_eq!(contacts.len(), 1);
    // Box top is at z = 0.5, sphere bottom at 0.4
    assert_relative_eq!(contacts[0].depth, 0.1, epsilon = 1e-5);
    assert_relative_eq!(contacts[0].normal.z, 1.0, epsilon = 1e-5);
}

#[test]
fn sphere_center_inside_box_is_pushed_through_nearest_face() {
    let mut space = Space::new(SpaceKind::Simple);
    let s = space.add_geom(sphere(0.25), at(0.0, 0.0, 0.4));
    let b = space.add_geom(unit_box(), at(0.0, 0.0, 0.0));

    let contacts = collide(
        space.geom(s).unwrap(),
        space.geom(b).unwrap(),
        4,
        &SurfaceParams::default(),
    );
    assert_eq!(contacts.len(), 1);
    assert_relative_eq!(contacts[0].normal.z, 1.0, epsilon = 1e-5);
    assert!(contacts[0].depth > 0.25);
}

#[test]
fn resting_box_touches_plane_at_four_corners() {
    let mut space = Space::new(SpaceKind::Simple);
    let b = space.add_geom(unit_box(), at(0.0, 0.0, 0.45));
    let p = space.add_geom(ground_plane(), Transform::identity());

    let contacts = collide(
        space.geom(b).unwrap(),
        space.geom(p).unwrap(),
        8,
        &SurfaceParams::default(),
    );
    assert_eq!(contacts.len(), 4);
    for contact in &contacts {
        assert_relative_eq!(contact.depth, 0.05, epsilon = 1e-5);
        assert_relative_eq!(contact.normal.z, 1.0);
    }
}

#[test]
fn stacked_boxes_touch_on_a_face() {
    let mut space = Space::new(SpaceKind::Simple);
    let top = space.add_geom(unit_box(), at(0.0, 0.0, 0.9));
    let bottom = space.add_geom(unit_box(), at(0.0, 0.0, 0.0));

    let contacts = collide(
        space.geom(top).unwrap(),
        space.geom(bottom).unwrap(),
        8,
        &SurfaceParams::default(),
    );
    assert_eq!(contacts.len(), 4);
    for contact in &contacts {
        assert_relative_eq!(contact.depth, 0.1, epsilon = 1e-4);
        assert_relative_eq!(contact.normal.z, 1.0, epsilon = 1e-4);
    }
}

#[test]
fn separated_boxes_do_not_touch() {
    let mut space = Space::new(SpaceKind::Simple);
    let a = space.add_geom(unit_box(), at(0.0, 0.0, 2.0));
    let rotated = Transform::new(
        Vector3::new(0.1, 0.2, 0.0),
        Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 1.0), 0.5),
    );
    let b = space.add_geom(unit_box(), rotated);

    let contacts = collide(
        space.geom(a).unwrap(),
        space.geom(b).unwrap(),
        8,
        &SurfaceParams::default(),
    );
    assert!(contacts.is_empty());
}

#[test]
fn truncation_keeps_the_deepest_contacts() {
    let mut space = Space::new(SpaceKind::Simple);
    // Tilted box: the penetrating corners have different depths
    let pose = Transform::new(
        Vector3::new(0.0, 0.0, 0.4),
        Quaternion::from_axis_angle(Vector3::unit_x(), 0.15),
    );
    let b = space.add_geom(unit_box(), pose);
    let p = space.add_geom(ground_plane(), Transform::identity());

    let surface = SurfaceParams::default();
    let all = collide(space.geom(b).unwrap(), space.geom(p).unwrap(), 8, &surface);
    assert!(all.len() > 2);

    let kept = collide(space.geom(b).unwrap(), space.geom(p).unwrap(), 2, &surface);
    assert_eq!(kept.len(), 2);

    let mut depths: Vec<f32> = all.iter().map(|c| c.depth).collect();
    depths.sort_by(|a, b| b.partial_cmp(a).unwrap());
    let mut kept_depths: Vec<f32> = kept.iter().map(|c| c.depth).collect();
    kept_depths.sort_by(|a, b| b.partial_cmp(a).unwrap());
    assert_eq!(kept_depths, depths[..2].to_vec());
}

#[test]
fn zero_contact_limit_produces_nothing() {
    let mut space = Space::new(SpaceKind::Simple);
    let s = space.add_geom(sphere(1.0), at(0.0, 0.0, 0.5));
    let p = space.add_geom(ground_plane(), Transform::identity());

    let contacts = collide(
        space.geom(s).unwrap(),
        space.geom(p).unwrap(),
        0,
        &SurfaceParams::default(),
    );
    assert!(contacts.is_empty());
}

#[test]
fn sphere_against_triangle_mesh() {
    let data = Arc::new(
        TriMeshData::from_buffers(
            &[
                -2.0, -2.0, 0.0, //
                2.0, -2.0, 0.0, //
                0.0, 2.0, 0.0,
            ],
            &[0, 1, 2],
        )
        .unwrap(),
    );

    let mut space = Space::new(SpaceKind::Simple);
    let s = space.add_geom(sphere(0.5), at(0.0, 0.0, 0.3));
    let m = space.add_geom(Shape::TriMesh(TriMesh::new(data)), Transform::identity());

    let contacts = collide(
        space.geom(s).unwrap(),
        space.geom(m).unwrap(),
        4,
        &SurfaceParams::default(),
    );
    assert_eq!(contacts.len(), 1);
    assert_relative_eq!(contacts[0].depth, 0.2, epsilon = 1e-5);
    assert_relative_eq!(contacts[0].normal.z, 1.0, epsilon = 1e-5);
}

#[test]
fn unsupported_pairs_produce_no_contacts() {
    let data = Arc::new(
        TriMeshData::from_buffers(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2])
            .unwrap(),
    );

    let mut space = Space::new(SpaceKind::Simple);
    let b = space.add_geom(unit_box(), at(0.0, 0.0, 0.0));
    let m = space.add_geom(Shape::TriMesh(TriMesh::new(data)), Transform::identity());

    let contacts = collide(
        space.geom(b).unwrap(),
        space.geom(m).unwrap(),
        8,
        &SurfaceParams::default(),
    );
    assert!(contacts.is_empty());
}

#[test]
fn surface_params_are_stamped_onto_contacts() {
    let mut space = Space::new(SpaceKind::Simple);
    let s = space.add_geom(sphere(0.5), at(0.0, 0.0, 0.3));
    let p = space.add_geom(ground_plane(), Transform::identity());

    let surface = SurfaceParams {
        friction: 50.0,
        soft_erp: Some(0.96),
        soft_cfm: Some(0.04),
    };
    let contacts = collide(space.geom(s).unwrap(), space.geom(p).unwrap(), 4, &surface);
    assert_eq!(contacts.len(), 1);
    assert_relative_eq!(contacts[0].surface.friction, 50.0);
    assert_eq!(contacts[0].surface.soft_erp, Some(0.96));
}

#[test]
fn simple_space_reports_overlapping_pairs_in_order() {
    let mut space = Space::new(SpaceKind::Simple);
    let a = space.add_geom(sphere(1.0), at(0.0, 0.0, 0.0));
    let b = space.add_geom(sphere(1.0), at(1.5, 0.0, 0.0));
    let _far = space.add_geom(sphere(1.0), at(100.0, 0.0, 0.0));

    let pairs = space.collide();
    assert_eq!(pairs, vec![(a, b)]);
}

#[test]
fn disabled_geoms_are_skipped() {
    let mut space = Space::new(SpaceKind::Simple);
    let a = space.add_geom(sphere(1.0), at(0.0, 0.0, 0.0));
    let b = space.add_geom(sphere(1.0), at(1.5, 0.0, 0.0));

    space.set_enabled(a, false).unwrap();
    assert!(space.collide().is_empty());
    space.set_enabled(a, true).unwrap();
    assert_eq!(space.collide(), vec![(a, b)]);
}

#[test]
fn hash_space_finds_the_same_pairs_as_simple() {
    let positions: Vec<Vector3> = (0..20)
        .map(|i| {
            let f = i as f32;
            Vector3::new((f * 0.37).sin() * 4.0, (f * 0.73).cos() * 4.0, f * 0.21)
        })
        .collect();

    let mut simple = Space::new(SpaceKind::Simple);
    let mut hash = Space::new(SpaceKind::Hash { cell_size: 2.0 });
    for &p in &positions {
        simple.add_geom(sphere(0.8), Transform::from_position(p));
        hash.add_geom(sphere(0.8), Transform::from_position(p));
    }

    assert_eq!(simple.collide(), hash.collide());
}

#[test]
fn planes_in_a_hash_space_are_tested_against_everything() {
    let mut space = Space::new(SpaceKind::Hash { cell_size: 1.0 });
    let p = space.add_geom(ground_plane(), Transform::identity());
    let s = space.add_geom(sphere(0.5), at(40.0, -3.0, 0.2));

    assert_eq!(space.collide(), vec![(p, s)]);
}

#[test]
fn subspace_members_collide_with_the_parent() {
    let mut space = Space::new(SpaceKind::Simple);
    let outer = space.add_geom(sphere(1.0), at(0.0, 0.0, 0.0));

    let inner_space = space.add_subspace(Space::ROOT, SpaceKind::Simple).unwrap();
    let inner = space
        .add_geom_in(inner_space, sphere(1.0), at(1.0, 0.0, 0.0))
        .unwrap();
    let inner_far = space
        .add_geom_in(inner_space, sphere(1.0), at(50.0, 0.0, 0.0))
        .unwrap();

    let pairs = space.collide();
    assert_eq!(pairs, vec![(outer, inner)]);

    // Members of the same subspace still collide with each other
    let near = space
        .add_geom_in(inner_space, sphere(1.0), at(49.0, 0.0, 0.0))
        .unwrap();
    let pairs = space.collide();
    assert!(pairs.contains(&(inner_far, near)));
    assert!(pairs.contains(&(outer, inner)));
}

#[test]
fn sibling_subspaces_collide_with_each_other() {
    let mut space = Space::new(SpaceKind::Simple);
    let left = space.add_subspace(Space::ROOT, SpaceKind::Simple).unwrap();
    let right = space.add_subspace(Space::ROOT, SpaceKind::Hash { cell_size: 1.0 }).unwrap();

    let a = space.add_geom_in(left, sphere(1.0), at(0.0, 0.0, 0.0)).unwrap();
    let b = space.add_geom_in(right, sphere(1.0), at(1.2, 0.0, 0.0)).unwrap();

    assert_eq!(space.collide(), vec![(a, b)]);
}

#[test]
fn geoms_follow_their_bodies() {
    let mut world = World::new();
    let body = world.add_body(RigidBody::new(Vector3::new(3.0, 4.0, 5.0)));

    let mut space = Space::new(SpaceKind::Simple);
    let geom = space.add_geom(sphere(1.0), Transform::identity());
    space.attach_body(geom, body).unwrap();

    space.update(&world).unwrap();
    let pose = space.geom(geom).unwrap().pose();
    assert_relative_eq!(pose.position.x, 3.0);
    assert_relative_eq!(pose.position.z, 5.0);

    world.remove_body(body).unwrap();
    assert!(space.update(&world).is_err());
}

#[test]
fn planes_cannot_follow_a_body() {
    let mut world = World::new();
    let body = world.add_body(RigidBody::new(Vector3::zero()));

    let mut space = Space::new(SpaceKind::Simple);
    let geom = space.add_geom(ground_plane(), Transform::identity());
    assert!(space.attach_body(geom, body).is_err());
}
