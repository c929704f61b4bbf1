//! Boxes sliding around a walled stage, confined to the ground plane by
//! planar joints. The first box is motor-driven along a circular path
//! and shoves the others out of its way. Rendered top-down in the
//! terminal.

use crossterm::{cursor, execute, terminal};
use rand::Rng;
use rigid_engine::bodies::MassProperties;
use rigid_engine::constraints::Plane2dJoint;
use rigid_engine::math::{Transform, Vector2};
use rigid_engine::shapes::{BoxShape, Plane, Shape};
use rigid_engine::{
    Joint, Renderer, RigidBody, Simulation, Space, SpaceKind, StepSettings, SurfaceParams, Vector3,
    World,
};
use std::io::{stdout, Write};
use std::time::Duration;

const STAGE: f32 = 8.0;
const BOX_COUNT: usize = 20;
const BOX_SIDE: f32 = 0.4;
const TRACK_FORCE: f32 = 10.0;

const COLS: usize = 60;
const ROWS: usize = 30;

struct TopDownConsole {
    cells: Vec<char>,
}

impl TopDownConsole {
    fn new() -> Self {
        Self {
            cells: vec![' '; COLS * ROWS],
        }
    }

    fn clear(&mut self) {
        self.cells.fill(' ');
    }

    fn plot(&mut self, x: f32, y: f32, glyph: char) {
        let col = (x / STAGE * COLS as f32) as isize;
        let row = (y / STAGE * ROWS as f32) as isize;
        if (0..COLS as isize).contains(&col) && (0..ROWS as isize).contains(&row) {
            self.cells[row as usize * COLS + col as usize] = glyph;
        }
    }

    fn present(&self) -> std::io::Result<()> {
        let mut out = stdout();
        execute!(
            out,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        writeln!(out, "+{}+", "-".repeat(COLS))?;
        for row in 0..ROWS {
            let line: String = self.cells[row * COLS..(row + 1) * COLS].iter().collect();
            writeln!(out, "|{line}|")?;
        }
        writeln!(out, "+{}+", "-".repeat(COLS))?;
        out.flush()
    }
}

impl Renderer for TopDownConsole {
    fn set_viewpoint(&mut self, _eye: Vector3, _target: Vector3) {}

    fn draw_box(&mut self, pose: &Transform, _sides: Vector3) {
        self.plot(pose.position.x, pose.position.y, '#');
    }

    fn draw_sphere(&mut self, pose: &Transform, _radius: f32) {
        self.plot(pose.position.x, pose.position.y, 'o');
    }

    fn draw_triangle(&mut self, _a: Vector3, _b: Vector3, _c: Vector3) {}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut world = World::new();
    world.set_gravity(Vector3::new(0.0, 0.0, -1.0))?;
    world.set_erp(0.5)?;
    world.set_cfm(1e-3)?;

    let mut space = Space::new(SpaceKind::Hash { cell_size: 1.0 });

    // Four vertical walls around the stage, solid side facing inward
    space.add_geom(Shape::Plane(Plane::new(1.0, 0.0, 0.0, 0.0)?), Transform::identity());
    space.add_geom(
        Shape::Plane(Plane::new(-1.0, 0.0, 0.0, -STAGE)?),
        Transform::identity(),
    );
    space.add_geom(Shape::Plane(Plane::new(0.0, 1.0, 0.0, 0.0)?), Transform::identity());
    space.add_geom(
        Shape::Plane(Plane::new(0.0, -1.0, 0.0, -STAGE)?),
        Transform::identity(),
    );

    let mut rng = rand::thread_rng();
    let mut tracked_joint = None;
    let mut tracked_body = None;

    for index in 0..BOX_COUNT {
        let position = Vector3::new(
            rng.gen_range(1.0..STAGE - 1.0),
            rng.gen_range(1.0..STAGE - 1.0),
            0.0,
        );
        let body = world.add_body(RigidBody::new(position));
        world
            .body_mut(body)?
            .set_mass(MassProperties::box_sides(1.0, BOX_SIDE, BOX_SIDE, BOX_SIDE))?;

        let joint = world.add_joint(Joint::Plane2d(Plane2dJoint::new(body)));
        if index == 0 {
            tracked_joint = Some(joint);
            tracked_body = Some(body);
        }

        let geom = space.add_geom(
            Shape::Box(BoxShape::new(BOX_SIDE, BOX_SIDE, BOX_SIDE)?),
            Transform::identity(),
        );
        space.attach_body(geom, body)?;
    }

    let settings = StepSettings {
        surface: SurfaceParams::with_friction(0.5),
        ..Default::default()
    };
    let mut sim = Simulation::with_settings(world, space, settings);
    let mut console = TopDownConsole::new();

    let (joint, leader) = (
        tracked_joint.expect("at least one box"),
        tracked_body.expect("at least one box"),
    );

    for frame in 0..600u32 {
        // Lead the first box around a circle in the middle of the stage
        let angle = frame as f32 * 0.02;
        let target = Vector2::new(
            STAGE * 0.5 + 2.5 * angle.cos(),
            STAGE * 0.5 + 2.5 * angle.sin(),
        );
        sim.track_to_position(joint, target, TRACK_FORCE)?;
        sim.frame(false)?;

        console.clear();
        sim.render(&mut console);
        let leader_pos = sim.world().body(leader)?.position();
        console.plot(leader_pos.x, leader_pos.y, '@');
        console.present()?;

        std::thread::sleep(Duration::from_millis(30));
    }

    Ok(())
}
