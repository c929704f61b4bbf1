use crate::constraints::RowContext;
use crate::core::solver::ConstraintRow;
use crate::core::BodyHandle;
use crate::math::{Quaternion, Vector3};

/// A velocity motor on one planar degree of freedom.
///
/// Inactive while `max_force` is zero; otherwise the solver drives the
/// body toward `target_velocity` with an impulse bounded by the force
/// limit times the step size.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotorParams {
    /// Velocity the motor tries to reach
    pub target_velocity: f32,

    /// Maximum force the motor may apply, >= 0
    pub max_force: f32,
}

/// Confines a body to planar motion: linear velocity stays in the x-y
/// plane and the body only rotates about z.
///
/// The constraint is velocity-level only, so numerical drift slowly
/// tilts the orientation out of plane; the world corrects this after
/// each step by projecting the quaternion back onto the plane's
/// rotation subgroup.
pub struct Plane2dJoint {
    body: BodyHandle,
    x_motor: MotorParams,
    y_motor: MotorParams,
    angular_motor: MotorParams,
}

impl Plane2dJoint {
    /// Creates a planar constraint for the given body, with no motors
    pub fn new(body: BodyHandle) -> Self {
        Self {
            body,
            x_motor: MotorParams::default(),
            y_motor: MotorParams::default(),
            angular_motor: MotorParams::default(),
        }
    }

    /// Returns the constrained body
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Sets the in-plane x velocity motor
    pub fn set_x_motor(&mut self, motor: MotorParams) {
        self.x_motor = motor;
    }

    /// Sets the in-plane y velocity motor
    pub fn set_y_motor(&mut self, motor: MotorParams) {
        self.y_motor = motor;
    }

    /// Sets the motor for rotation about z
    pub fn set_angular_motor(&mut self, motor: MotorParams) {
        self.angular_motor = motor;
    }

    /// Returns the x motor parameters
    pub fn x_motor(&self) -> MotorParams {
        self.x_motor
    }

    /// Returns the y motor parameters
    pub fn y_motor(&self) -> MotorParams {
        self.y_motor
    }

    pub(crate) fn append_rows(&self, ctx: &RowContext, rows: &mut Vec<ConstraintRow>) {
        let Some(index) = ctx.index_of(self.body) else {
            return;
        };

        // Hold the body in the plane: no z velocity, plus a bias that
        // pulls accumulated z drift back toward zero
        let drift = ctx.positions[index].z;
        let mut z_row = ConstraintRow::new();
        z_row.body_a = Some(index);
        z_row.j_lin_a = Vector3::unit_z();
        z_row.rhs = -ctx.erp / ctx.dt * drift;
        z_row.cfm = ctx.cfm;
        rows.push(z_row);

        for axis in [Vector3::unit_x(), Vector3::unit_y()] {
            let mut tilt_row = ConstraintRow::new();
            tilt_row.body_a = Some(index);
            tilt_row.j_ang_a = axis;
            tilt_row.cfm = ctx.cfm;
            rows.push(tilt_row);
        }

        let motors = [
            (self.x_motor, Vector3::unit_x(), Vector3::zero()),
            (self.y_motor, Vector3::unit_y(), Vector3::zero()),
            (self.angular_motor, Vector3::zero(), Vector3::unit_z()),
        ];
        for (motor, lin, ang) in motors {
            if motor.max_force <= 0.0 {
                continue;
            }
            let limit = motor.max_force * ctx.dt;
            let mut row = ConstraintRow::new();
            row.body_a = Some(index);
            row.j_lin_a = lin;
            row.j_ang_a = ang;
            row.rhs = motor.target_velocity;
            row.cfm = ctx.cfm;
            row.lo = -limit;
            row.hi = limit;
            rows.push(row);
        }
    }

    /// Projects an orientation back onto rotations about z
    pub(crate) fn project_orientation(rotation: Quaternion) -> Quaternion {
        Quaternion::new(rotation.w, 0.0, 0.0, rotation.z).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn projection_removes_out_of_plane_tilt() {
        let tilted = Quaternion::from_axis_angle(Vector3::unit_x(), 0.3)
            * Quaternion::from_axis_angle(Vector3::unit_z(), 1.0);
        let projected = Plane2dJoint::project_orientation(tilted);
        assert_relative_eq!(projected.x, 0.0);
        assert_relative_eq!(projected.y, 0.0);
        assert_relative_eq!(projected.length(), 1.0, epsilon = 1e-5);
    }
}
