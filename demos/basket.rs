//! A ball dropped into a shallow triangle-mesh basket with soft, very
//! frictional contacts. When the ball escapes or settles it is thrown
//! back in from a new spot. Rendered as a side view in the terminal.

use crossterm::{cursor, execute, terminal};
use rand::Rng;
use rigid_engine::bodies::MassProperties;
use rigid_engine::math::{Transform, Vector3};
use rigid_engine::shapes::{Shape, Sphere, TriMesh, TriMeshData};
use rigid_engine::{
    Renderer, RigidBody, Simulation, Space, SpaceKind, StepSettings, SurfaceParams, World,
};
use std::io::{stdout, Write};
use std::sync::Arc;
use std::time::Duration;

const BALL_RADIUS: f32 = 0.12;
const DROP_HEIGHT: f32 = 2.0;

const COLS: usize = 60;
const ROWS: usize = 24;
const VIEW_HALF_WIDTH: f32 = 1.5;
const VIEW_TOP: f32 = 2.5;
const VIEW_BOTTOM: f32 = -0.5;

/// An inverted square pyramid: rim at z = 0.5, apex at the origin
fn basket_mesh() -> Result<Arc<TriMeshData>, rigid_engine::error::PhysicsError> {
    let rim = 1.0;
    let vertices = [
        0.0, 0.0, 0.0, // apex
        -rim, -rim, 0.5, //
        rim, -rim, 0.5, //
        rim, rim, 0.5, //
        -rim, rim, 0.5,
    ];
    let indices = [
        0, 1, 2, //
        0, 2, 3, //
        0, 3, 4, //
        0, 4, 1,
    ];
    Ok(Arc::new(TriMeshData::from_buffers(&vertices, &indices)?))
}

struct SideViewConsole {
    cells: Vec<char>,
}

impl SideViewConsole {
    fn new() -> Self {
        Self {
            cells: vec![' '; COLS * ROWS],
        }
    }

    fn clear(&mut self) {
        self.cells.fill(' ');
    }

    fn plot(&mut self, x: f32, z: f32, glyph: char) {
        let col = ((x + VIEW_HALF_WIDTH) / (2.0 * VIEW_HALF_WIDTH) * COLS as f32) as isize;
        let row = ((VIEW_TOP - z) / (VIEW_TOP - VIEW_BOTTOM) * ROWS as f32) as isize;
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
        for row in 0..ROWS {
            let line: String = self.cells[row * COLS..(row + 1) * COLS].iter().collect();
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}

impl Renderer for SideViewConsole {
    fn set_viewpoint(&mut self, _eye: Vector3, _target: Vector3) {}

    fn draw_box(&mut self, pose: &Transform, _sides: Vector3) {
        self.plot(pose.position.x, pose.position.z, '#');
    }

    fn draw_sphere(&mut self, pose: &Transform, _radius: f32) {
        self.plot(pose.position.x, pose.position.z, 'O');
    }

    fn draw_triangle(&mut self, a: Vector3, b: Vector3, c: Vector3) {
        for p in [a, b, c, (a + b + c) / 3.0] {
            self.plot(p.x, p.z, '.');
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut world = World::new();
    world.set_gravity(Vector3::new(0.0, 0.0, -9.8))?;

    let mut space = Space::new(SpaceKind::Simple);
    space.add_geom(
        Shape::TriMesh(TriMesh::new(basket_mesh()?)),
        Transform::identity(),
    );

    let mut rng = rand::thread_rng();
    let ball = world.add_body(RigidBody::new(Vector3::new(0.0, 0.0, DROP_HEIGHT)));
    world
        .body_mut(ball)?
        .set_mass(MassProperties::sphere(1.0, BALL_RADIUS))?;

    let geom = space.add_geom(
        Shape::Sphere(Sphere::new(BALL_RADIUS)?),
        Transform::identity(),
    );
    space.attach_body(geom, ball)?;

    let settings = StepSettings {
        max_contacts: 32,
        surface: SurfaceParams {
            friction: 50.0,
            soft_erp: Some(0.96),
            soft_cfm: Some(0.04),
        },
        ..Default::default()
    };
    let mut sim = Simulation::with_settings(world, space, settings);
    let mut console = SideViewConsole::new();

    for _ in 0..1000u32 {
        sim.frame(false)?;

        // Throw the ball back in if it falls out or comes to rest
        let body = sim.world().body(ball)?;
        let fell_out = body.position().z < VIEW_BOTTOM;
        let settled = body.position().z < 0.6 && body.linear_velocity().length() < 0.02;
        if fell_out || settled {
            let x = rng.gen_range(-0.5..0.5);
            let y = rng.gen_range(-0.5..0.5);
            let body = sim.world_mut().body_mut(ball)?;
            body.set_position(Vector3::new(x, y, DROP_HEIGHT))?;
            body.set_linear_velocity(Vector3::zero())?;
            body.set_angular_velocity(Vector3::zero())?;
        }

        console.clear();
        sim.render(&mut console);
        console.present()?;
        std::thread::sleep(Duration::from_millis(10));
    }

    Ok(())
}
