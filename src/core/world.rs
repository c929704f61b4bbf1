use crate::bodies::RigidBody;
use crate::constraints::{Joint, JointGroup, Plane2dJoint, RowContext};
use crate::core::solver::{self, BodyState};
use crate::core::{BodyHandle, Handle, HandleStorage, JointHandle, WorldConfig};
use crate::error::PhysicsError;
use crate::math::Vector3;
use crate::Result;
use std::collections::BTreeMap;

/// The dynamics world: rigid bodies, persistent joints, and the
/// stepping machinery that advances them.
///
/// Worlds are plain owned values; independent worlds never share state
/// and can be stepped from different threads.
pub struct World {
    bodies: HandleStorage<BodyHandle, RigidBody>,
    joints: HandleStorage<JointHandle, Joint>,
    config: WorldConfig,
    diagnostics: Option<Box<dyn FnMut(&str)>>,
    time: f32,
}

impl World {
    /// Creates a world with default configuration
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a world with the given configuration
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            bodies: HandleStorage::new(),
            joints: HandleStorage::new(),
            config,
            diagnostics: None,
            time: 0.0,
        }
    }

    /// Returns the world configuration
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Returns the accumulated simulation time
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Sets the gravity acceleration
    pub fn set_gravity(&mut self, gravity: Vector3) -> Result<()> {
        if !gravity.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "non-finite gravity {gravity}"
            )));
        }
        self.config.gravity = gravity;
        Ok(())
    }

    /// Returns the gravity acceleration
    pub fn gravity(&self) -> Vector3 {
        self.config.gravity
    }

    /// Sets the global error-reduction parameter, in [0, 1]
    pub fn set_erp(&mut self, erp: f32) -> Result<()> {
        if !erp.is_finite() || !(0.0..=1.0).contains(&erp) {
            return Err(PhysicsError::InvalidParameter(format!(
                "erp must lie in [0, 1], got {erp}"
            )));
        }
        self.config.erp = erp;
        Ok(())
    }

    /// Sets the global constraint-force mixing, >= 0
    pub fn set_cfm(&mut self, cfm: f32) -> Result<()> {
        if !cfm.is_finite() || cfm < 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "cfm must be non-negative, got {cfm}"
            )));
        }
        self.config.cfm = cfm;
        Ok(())
    }

    /// Sets the number of solver passes per step
    pub fn set_solver_iterations(&mut self, iterations: u32) -> Result<()> {
        if iterations == 0 {
            return Err(PhysicsError::InvalidParameter(
                "solver needs at least one iteration".to_string(),
            ));
        }
        self.config.solver_iterations = iterations;
        Ok(())
    }

    /// Installs a callback for non-fatal solver diagnostics, such as
    /// degenerate constraint rows
    pub fn set_diagnostics<F: FnMut(&str) + 'static>(&mut self, callback: F) {
        self.diagnostics = Some(Box::new(callback));
    }

    /// Adds a body to the world
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        self.bodies.add(body)
    }

    /// Returns a body by handle
    pub fn body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.bodies.get_or_err(handle)
    }

    /// Returns a mutable body by handle
    pub fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        self.bodies.get_mut_or_err(handle)
    }

    /// Returns the number of bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Returns an iterator over all bodies in handle order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    /// Removes a body, detaching every joint that referenced it
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<RigidBody> {
        let body = self.bodies.remove(handle).ok_or_else(|| {
            PhysicsError::InvalidReference(format!("body #{} not found", handle.raw()))
        })?;
        let stale: Vec<JointHandle> = self
            .joints
            .iter()
            .filter(|(_, joint)| joint.involves_body(handle))
            .map(|(h, _)| h)
            .collect();
        for joint in stale {
            self.joints.remove(joint);
        }
        Ok(body)
    }

    /// Adds a persistent joint to the world
    pub fn add_joint(&mut self, joint: Joint) -> JointHandle {
        self.joints.add(joint)
    }

    /// Returns a joint by handle
    pub fn joint(&self, handle: JointHandle) -> Result<&Joint> {
        self.joints.get_or_err(handle)
    }

    /// Returns a mutable joint by handle
    pub fn joint_mut(&mut self, handle: JointHandle) -> Result<&mut Joint> {
        self.joints.get_mut_or_err(handle)
    }

    /// Removes a persistent joint
    pub fn remove_joint(&mut self, handle: JointHandle) -> Result<()> {
        self.joints.remove(handle).ok_or_else(|| {
            PhysicsError::InvalidReference(format!("joint #{} not found", handle.raw()))
        })?;
        Ok(())
    }

    /// Returns whether two bodies share a persistent non-contact joint.
    ///
    /// Contact joints do not count as connections: touching bodies must
    /// still collide next step.
    pub fn are_connected(&self, a: BodyHandle, b: BodyHandle) -> bool {
        self.joints.iter().any(|(_, joint)| {
            !matches!(joint, Joint::Contact(_)) && joint.involves_body(a) && joint.involves_body(b)
        })
    }

    /// Advances the world by `dt` using only persistent joints
    pub fn step(&mut self, dt: f32) -> Result<()> {
        self.step_internal(dt, None)
    }

    /// Advances the world by `dt` with an extra group of transient
    /// contact joints.
    ///
    /// The group is only read; the caller clears it between steps.
    pub fn step_with_contacts(&mut self, dt: f32, contacts: &JointGroup) -> Result<()> {
        self.step_internal(dt, Some(contacts))
    }

    fn step_internal(&mut self, dt: f32, contacts: Option<&JointGroup>) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "step size must be finite and positive, got {dt}"
            )));
        }

        // Apply gravity and accumulated forces to velocities
        let gravity = self.config.gravity;
        for (_, body) in self.bodies.iter_mut() {
            if !body.is_enabled() {
                continue;
            }
            if body.is_affected_by_gravity() {
                let weight = gravity * body.mass();
                body.add_force(weight);
            }
            body.integrate_forces(dt);
        }

        // Gather the enabled bodies into a dense working set
        let mut indices = BTreeMap::new();
        let mut handles = Vec::new();
        let mut positions = Vec::new();
        let mut states = Vec::new();
        for (handle, body) in self.bodies.iter() {
            if !body.is_enabled() {
                continue;
            }
            indices.insert(handle, states.len());
            handles.push(handle);
            positions.push(body.position());
            states.push(BodyState {
                inv_mass: body.inverse_mass(),
                inv_inertia_world: *body.inverse_inertia_tensor_world(),
                linear_velocity: body.linear_velocity(),
                angular_velocity: body.angular_velocity(),
            });
        }

        // Build constraint rows: persistent joints first, then contacts
        let ctx = RowContext {
            dt,
            erp: self.config.erp,
            cfm: self.config.cfm,
            indices: &indices,
            positions: &positions,
        };
        let mut rows = Vec::new();
        for (_, joint) in self.joints.iter() {
            joint.append_rows(&ctx, &mut rows);
        }
        if let Some(group) = contacts {
            for joint in group.iter() {
                joint.append_rows(&ctx, &mut rows);
            }
        }

        let degenerate = solver::solve(&mut rows, &mut states, self.config.solver_iterations);
        if degenerate > 0 {
            if let Some(callback) = &mut self.diagnostics {
                callback(&format!(
                    "solver softened {degenerate} degenerate constraint row(s)"
                ));
            }
        }

        // Scatter solved velocities back and integrate poses
        for (index, &handle) in handles.iter().enumerate() {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.set_velocities_unchecked(
                    states[index].linear_velocity,
                    states[index].angular_velocity,
                );
            }
        }
        for (_, body) in self.bodies.iter_mut() {
            if body.is_enabled() {
                body.integrate_velocity(dt);
            }
            body.clear_accumulators();
        }

        // The planar constraint only restrains velocities; drift in the
        // orientation is projected away after integration
        let planar: Vec<BodyHandle> = self
            .joints
            .iter()
            .filter_map(|(_, joint)| match joint {
                Joint::Plane2d(j) => Some(j.body()),
                _ => None,
            })
            .collect();
        for handle in planar {
            if let Some(body) = self.bodies.get_mut(handle) {
                let projected = Plane2dJoint::project_orientation(body.rotation());
                body.set_rotation_unchecked(projected);
                let linear = body.linear_velocity();
                let angular = body.angular_velocity();
                body.set_velocities_unchecked(linear, Vector3::new(0.0, 0.0, angular.z));
            }
        }

        for (handle, body) in self.bodies.iter() {
            if !body.is_finite() {
                return Err(PhysicsError::NumericalInstability(format!(
                    "body #{} has non-finite state after step",
                    handle.raw()
                )));
            }
        }

        self.time += dt;
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
