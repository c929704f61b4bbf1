//! The collide-step-empty simulation loop.
//!
//! [`Simulation`] owns a world and a space and advances them together:
//! each frame runs a fixed number of substeps, and each substep updates
//! geom poses, generates contacts, steps the world with them, and
//! discards the contact group.

mod renderer;

pub use self::renderer::Renderer;

use crate::collision::{narrow_phase, Space, SurfaceParams};
use crate::constraints::{ContactJoint, Joint, JointGroup, MotorParams};
use crate::core::{JointHandle, World};
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::shapes::Shape;
use crate::Result;

/// Fixed-step settings for the simulation loop
#[derive(Debug, Clone, Copy)]
pub struct StepSettings {
    /// Substep size in seconds
    pub time_step: f32,

    /// Number of substeps per frame
    pub substeps: u32,

    /// Most contacts kept per colliding pair; the deepest win
    pub max_contacts: usize,

    /// Surface parameters stamped onto every generated contact
    pub surface: SurfaceParams,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            time_step: 0.01,
            substeps: 10,
            max_contacts: 8,
            surface: SurfaceParams::default(),
        }
    }
}

/// A world and a space advanced in lockstep
pub struct Simulation {
    world: World,
    space: Space,
    contacts: JointGroup,
    settings: StepSettings,
}

impl Simulation {
    /// Creates a simulation with default step settings
    pub fn new(world: World, space: Space) -> Self {
        Self::with_settings(world, space, StepSettings::default())
    }

    /// Creates a simulation with the given step settings
    pub fn with_settings(world: World, space: Space, settings: StepSettings) -> Self {
        Self {
            world,
            space,
            contacts: JointGroup::new(),
            settings,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn space_mut(&mut self) -> &mut Space {
        &mut self.space
    }

    pub fn settings(&self) -> StepSettings {
        self.settings
    }

    pub fn settings_mut(&mut self) -> &mut StepSettings {
        &mut self.settings
    }

    /// Advances the simulation by one frame of substeps.
    ///
    /// While paused, nothing moves but the simulation stays valid, so
    /// callers can keep rendering.
    pub fn frame(&mut self, pause: bool) -> Result<()> {
        if pause {
            return Ok(());
        }
        for _ in 0..self.settings.substeps {
            self.substep()?;
        }
        Ok(())
    }

    fn substep(&mut self) -> Result<()> {
        self.space.update(&self.world)?;

        self.contacts.clear();
        for (ha, hb) in self.space.collide() {
            let geom_a = self.space.geom(ha)?;
            let geom_b = self.space.geom(hb)?;
            let body_a = geom_a.body();
            let body_b = geom_b.body();

            // Two static geoms never move apart; a pair linked by a
            // persistent joint is allowed to interpenetrate
            if body_a.is_none() && body_b.is_none() {
                continue;
            }
            if let (Some(a), Some(b)) = (body_a, body_b) {
                if self.world.are_connected(a, b) {
                    continue;
                }
            }

            for contact in narrow_phase::collide(
                geom_a,
                geom_b,
                self.settings.max_contacts,
                &self.settings.surface,
            ) {
                self.contacts
                    .add(Joint::Contact(ContactJoint::new(body_a, body_b, contact)));
            }
        }

        let result = self
            .world
            .step_with_contacts(self.settings.time_step, &self.contacts);
        self.contacts.clear();
        result
    }

    /// Drives a planar joint's motors toward a target point.
    ///
    /// The motor velocity is proportional to the remaining distance, so
    /// the body decelerates smoothly as it arrives.
    pub fn track_to_position(
        &mut self,
        joint: JointHandle,
        target: Vector2,
        max_force: f32,
    ) -> Result<()> {
        let body = match self.world.joint(joint)? {
            Joint::Plane2d(planar) => planar.body(),
            _ => {
                return Err(PhysicsError::InvalidParameter(
                    "tracking requires a planar joint".to_string(),
                ))
            }
        };
        let position = self.world.body(body)?.position();

        if let Joint::Plane2d(planar) = self.world.joint_mut(joint)? {
            planar.set_x_motor(MotorParams {
                target_velocity: target.x - position.x,
                max_force,
            });
            planar.set_y_motor(MotorParams {
                target_velocity: target.y - position.y,
                max_force,
            });
        }
        Ok(())
    }

    /// Draws every enabled geom through the given renderer
    pub fn render(&self, renderer: &mut dyn Renderer) {
        for (_, geom) in self.space.iter() {
            if !geom.is_enabled() {
                continue;
            }
            let pose = geom.pose();
            match geom.shape() {
                Shape::Box(b) => renderer.draw_box(&pose, b.sides()),
                Shape::Sphere(s) => renderer.draw_sphere(&pose, s.radius),
                Shape::Plane(_) => {}
                Shape::TriMesh(m) => {
                    for i in 0..m.data.triangle_count() {
                        let tri = m.data.triangle(i).transformed(&pose);
                        renderer.draw_triangle(tri.a, tri.b, tri.c);
                    }
                }
            }
        }
    }
}
