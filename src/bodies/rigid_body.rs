use crate::bodies::{BodyFlags, MassProperties};
use crate::error::PhysicsError;
use crate::math::{Matrix3, Quaternion, Transform, Vector3};
use crate::Result;

/// A rigid body for physics simulation.
///
/// Bodies carry pose and velocity state plus force/torque accumulators that
/// are consumed and cleared by every world step. Integration is driven by
/// the world's constraint solver, never by calling the body directly.
pub struct RigidBody {
    /// The body's pose in world space
    transform: Transform,

    /// The body's linear velocity
    linear_velocity: Vector3,

    /// The body's angular velocity
    angular_velocity: Vector3,

    /// The body's mass
    mass: f32,

    /// Inverse of the body's mass (for efficiency)
    inv_mass: f32,

    /// The body's inertia tensor in the body frame
    inertia_tensor: Matrix3,

    /// Inverse of the body's inertia tensor in the body frame
    inv_inertia_tensor: Matrix3,

    /// Inverse of the body's inertia tensor in world space
    inv_inertia_tensor_world: Matrix3,

    /// Force accumulator, cleared each step
    force_accum: Vector3,

    /// Torque accumulator, cleared each step
    torque_accum: Vector3,

    /// The body's flags
    flags: BodyFlags,

    /// Opaque user tag
    user_data: u64,
}

impl RigidBody {
    /// Creates a new unit-mass body at the given position
    pub fn new(position: Vector3) -> Self {
        let mut body = Self {
            transform: Transform::from_position(position),
            linear_velocity: Vector3::zero(),
            angular_velocity: Vector3::zero(),
            mass: 1.0,
            inv_mass: 1.0,
            inertia_tensor: Matrix3::identity(),
            inv_inertia_tensor: Matrix3::identity(),
            inv_inertia_tensor_world: Matrix3::identity(),
            force_accum: Vector3::zero(),
            torque_accum: Vector3::zero(),
            flags: BodyFlags::default(),
            user_data: 0,
        };
        body.update_inertia_tensor_world();
        body
    }

    /// Returns the body's pose
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Returns the body's position
    pub fn position(&self) -> Vector3 {
        self.transform.position
    }

    /// Sets the body's position
    pub fn set_position(&mut self, position: Vector3) -> Result<()> {
        if !position.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "non-finite position {position}"
            )));
        }
        self.transform.position = position;
        Ok(())
    }

    /// Returns the body's rotation as a quaternion
    pub fn rotation(&self) -> Quaternion {
        self.transform.rotation
    }

    /// Sets the body's rotation (renormalized)
    pub fn set_rotation(&mut self, rotation: Quaternion) -> Result<()> {
        if !rotation.is_finite() {
            return Err(PhysicsError::InvalidParameter(
                "non-finite rotation".to_string(),
            ));
        }
        self.transform.rotation = rotation.normalize();
        self.update_inertia_tensor_world();
        Ok(())
    }

    /// Returns the body's linear velocity
    pub fn linear_velocity(&self) -> Vector3 {
        self.linear_velocity
    }

    /// Sets the body's linear velocity
    pub fn set_linear_velocity(&mut self, velocity: Vector3) -> Result<()> {
        if !velocity.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "non-finite linear velocity {velocity}"
            )));
        }
        self.linear_velocity = velocity;
        Ok(())
    }

    /// Returns the body's angular velocity
    pub fn angular_velocity(&self) -> Vector3 {
        self.angular_velocity
    }

    /// Sets the body's angular velocity
    pub fn set_angular_velocity(&mut self, velocity: Vector3) -> Result<()> {
        if !velocity.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "non-finite angular velocity {velocity}"
            )));
        }
        self.angular_velocity = velocity;
        Ok(())
    }

    /// Returns the body's mass
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Returns the body's inverse mass
    pub fn inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Returns the body's inertia tensor in the body frame
    pub fn inertia_tensor(&self) -> &Matrix3 {
        &self.inertia_tensor
    }

    /// Returns the body's inverse inertia tensor in world space
    pub fn inverse_inertia_tensor_world(&self) -> &Matrix3 {
        &self.inv_inertia_tensor_world
    }

    /// Sets the body's mass and inertia
    pub fn set_mass(&mut self, properties: MassProperties) -> Result<()> {
        if !(properties.mass.is_finite() && properties.mass > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "mass must be finite and positive, got {}",
                properties.mass
            )));
        }
        if !properties.inertia.is_finite() {
            return Err(PhysicsError::InvalidParameter(
                "non-finite inertia tensor".to_string(),
            ));
        }
        let inv_inertia = properties.inertia.inverse().ok_or_else(|| {
            PhysicsError::InvalidParameter("singular inertia tensor".to_string())
        })?;

        self.mass = properties.mass;
        self.inv_mass = 1.0 / properties.mass;
        self.inertia_tensor = properties.inertia;
        self.inv_inertia_tensor = inv_inertia;
        self.update_inertia_tensor_world();
        Ok(())
    }

    /// Returns the body's flags
    pub fn flags(&self) -> BodyFlags {
        self.flags
    }

    /// Sets the body's flags
    pub fn set_flags(&mut self, flags: BodyFlags) {
        self.flags = flags;
    }

    /// Returns whether the body participates in simulation
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(BodyFlags::ENABLED)
    }

    /// Returns whether the body is accelerated by world gravity
    pub fn is_affected_by_gravity(&self) -> bool {
        self.flags.contains(BodyFlags::AFFECTED_BY_GRAVITY)
    }

    /// Returns the opaque user tag
    pub fn user_data(&self) -> u64 {
        self.user_data
    }

    /// Sets the opaque user tag
    pub fn set_user_data(&mut self, data: u64) {
        self.user_data = data;
    }

    /// Adds a force through the center of mass for the next step
    pub fn add_force(&mut self, force: Vector3) {
        self.force_accum += force;
    }

    /// Adds a force at a world-space point, accumulating the induced torque
    pub fn add_force_at_point(&mut self, force: Vector3, point: Vector3) {
        self.force_accum += force;
        let r = point - self.transform.position;
        self.torque_accum += r.cross(&force);
    }

    /// Adds a torque for the next step
    pub fn add_torque(&mut self, torque: Vector3) {
        self.torque_accum += torque;
    }

    /// Returns the accumulated force
    pub fn accumulated_force(&self) -> Vector3 {
        self.force_accum
    }

    /// Clears the force and torque accumulators
    pub fn clear_accumulators(&mut self) {
        self.force_accum = Vector3::zero();
        self.torque_accum = Vector3::zero();
    }

    /// Updates the inverse inertia tensor in world space
    fn update_inertia_tensor_world(&mut self) {
        // Compute R * inv_I * R^T
        let rotation_matrix = self.transform.rotation.to_rotation_matrix();
        let temp = rotation_matrix.multiply_matrix(&self.inv_inertia_tensor);
        self.inv_inertia_tensor_world = temp.multiply_matrix(&rotation_matrix.transpose());
    }

    /// Integrates accumulated forces and torques into velocities
    pub(crate) fn integrate_forces(&mut self, dt: f32) {
        self.linear_velocity += self.force_accum * (self.inv_mass * dt);
        let angular_acceleration = self.inv_inertia_tensor_world.multiply_vector(self.torque_accum);
        self.angular_velocity += angular_acceleration * dt;
    }

    /// Integrates velocities to update the pose, renormalizing orientation
    pub(crate) fn integrate_velocity(&mut self, dt: f32) {
        self.transform.position += self.linear_velocity * dt;

        if !self.angular_velocity.is_zero() {
            let angle = self.angular_velocity.length() * dt;
            let axis = self.angular_velocity.normalize();

            let rotation = Quaternion::from_axis_angle(axis, angle);
            self.transform.rotation = (rotation * self.transform.rotation).normalize();
            self.update_inertia_tensor_world();
        }
    }

    /// Directly overwrites the rotation during error-correction passes
    pub(crate) fn set_rotation_unchecked(&mut self, rotation: Quaternion) {
        self.transform.rotation = rotation;
        self.update_inertia_tensor_world();
    }

    /// Directly overwrites the velocities during solver write-back
    pub(crate) fn set_velocities_unchecked(&mut self, linear: Vector3, angular: Vector3) {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
    }

    /// Returns whether the body's whole state is finite
    pub fn is_finite(&self) -> bool {
        self.transform.is_finite()
            && self.linear_velocity.is_finite()
            && self.angular_velocity.is_finite()
    }
}
