//! Projected Gauss-Seidel velocity solver.
//!
//! Joints contribute velocity constraint rows; the solver relaxes them
//! iteratively, clamping each row's accumulated impulse to its bounds.
//! Friction rows are bounded by the accumulated impulse of the normal
//! row they belong to, forming a friction pyramid.

use crate::math::{Matrix3, Vector3, EPSILON};

/// Velocity-level state of one body in the solver's working set.
///
/// Bodies are addressed by dense index here; the world maps handles to
/// indices when it gathers the working set and scatters results back.
pub(crate) struct BodyState {
    pub inv_mass: f32,
    pub inv_inertia_world: Matrix3,
    pub linear_velocity: Vector3,
    pub angular_velocity: Vector3,
}

/// One velocity constraint row: `J v = rhs` softened by `cfm`, with the
/// accumulated impulse clamped to `[lo, hi]`.
pub(crate) struct ConstraintRow {
    /// Dense index of the first body, if it is dynamic
    pub body_a: Option<usize>,

    /// Dense index of the second body, if it is dynamic
    pub body_b: Option<usize>,

    pub j_lin_a: Vector3,
    pub j_ang_a: Vector3,
    pub j_lin_b: Vector3,
    pub j_ang_b: Vector3,

    /// Target relative velocity, including any error-reduction bias
    pub rhs: f32,

    /// Softening added to the effective-mass diagonal
    pub cfm: f32,

    /// Lower impulse bound
    pub lo: f32,

    /// Upper impulse bound
    pub hi: f32,

    /// For friction rows: the index of the owning normal row. The
    /// bounds become `±scale * lambda_normal` each iteration.
    pub friction_of: Option<usize>,

    /// Friction coefficient for dependent rows
    pub friction_scale: f32,

    /// Accumulated impulse
    pub lambda: f32,

    /// Cached inverse effective mass, filled by the prepare pass
    inv_eff_mass: f32,
}

impl ConstraintRow {
    pub fn new() -> Self {
        Self {
            body_a: None,
            body_b: None,
            j_lin_a: Vector3::zero(),
            j_ang_a: Vector3::zero(),
            j_lin_b: Vector3::zero(),
            j_ang_b: Vector3::zero(),
            rhs: 0.0,
            cfm: 0.0,
            lo: f32::NEG_INFINITY,
            hi: f32::INFINITY,
            friction_of: None,
            friction_scale: 0.0,
            lambda: 0.0,
            inv_eff_mass: 0.0,
        }
    }

    /// Relative velocity along the row's Jacobian
    fn relative_velocity(&self, bodies: &[BodyState]) -> f32 {
        let mut v = 0.0;
        if let Some(a) = self.body_a {
            v += self.j_lin_a.dot(&bodies[a].linear_velocity)
                + self.j_ang_a.dot(&bodies[a].angular_velocity);
        }
        if let Some(b) = self.body_b {
            v += self.j_lin_b.dot(&bodies[b].linear_velocity)
                + self.j_ang_b.dot(&bodies[b].angular_velocity);
        }
        v
    }

    /// `J M^-1 J^T` for this row
    fn effective_mass_denominator(&self, bodies: &[BodyState]) -> f32 {
        let mut denom = 0.0;
        if let Some(a) = self.body_a {
            let body = &bodies[a];
            denom += body.inv_mass * self.j_lin_a.length_squared();
            denom += self
                .j_ang_a
                .dot(&body.inv_inertia_world.multiply_vector(self.j_ang_a));
        }
        if let Some(b) = self.body_b {
            let body = &bodies[b];
            denom += body.inv_mass * self.j_lin_b.length_squared();
            denom += self
                .j_ang_b
                .dot(&body.inv_inertia_world.multiply_vector(self.j_ang_b));
        }
        denom
    }
}

/// Relaxes the rows against the body working set.
///
/// Returns the number of degenerate rows (vanishing effective mass);
/// those rows are softened instead of solved exactly, and the caller
/// may report them through its diagnostics hook.
pub(crate) fn solve(
    rows: &mut [ConstraintRow],
    bodies: &mut [BodyState],
    iterations: u32,
) -> usize {
    let mut degenerate = 0;

    for row in rows.iter_mut() {
        let raw = row.effective_mass_denominator(bodies);
        if raw < EPSILON {
            // Constraint acts on no effective mass at all; soften it
            // rather than dividing by zero
            degenerate += 1;
        }
        row.inv_eff_mass = 1.0 / (raw + row.cfm).max(EPSILON);
    }

    for _ in 0..iterations {
        for i in 0..rows.len() {
            let (lo, hi) = match rows[i].friction_of {
                Some(normal) => {
                    let limit = rows[i].friction_scale * rows[normal].lambda.max(0.0);
                    (-limit, limit)
                }
                None => (rows[i].lo, rows[i].hi),
            };

            let row = &rows[i];
            let rel_vel = row.relative_velocity(bodies);
            let delta = (row.rhs - rel_vel - row.cfm * row.lambda) * row.inv_eff_mass;
            let lambda = (row.lambda + delta).clamp(lo, hi);
            let applied = lambda - rows[i].lambda;
            rows[i].lambda = lambda;

            if applied == 0.0 {
                continue;
            }

            let row = &rows[i];
            if let Some(a) = row.body_a {
                let body = &mut bodies[a];
                body.linear_velocity += row.j_lin_a * (body.inv_mass * applied);
                body.angular_velocity += body
                    .inv_inertia_world
                    .multiply_vector(row.j_ang_a * applied);
            }
            if let Some(b) = row.body_b {
                let body = &mut bodies[b];
                body.linear_velocity += row.j_lin_b * (body.inv_mass * applied);
                body.angular_velocity += body
                    .inv_inertia_world
                    .multiply_vector(row.j_ang_b * applied);
            }
        }
    }

    degenerate
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_body(velocity: Vector3) -> BodyState {
        BodyState {
            inv_mass: 1.0,
            inv_inertia_world: Matrix3::identity(),
            linear_velocity: velocity,
            angular_velocity: Vector3::zero(),
        }
    }

    #[test]
    fn single_row_reaches_target_velocity() {
        let mut bodies = vec![unit_body(Vector3::new(0.0, 0.0, -2.0))];
        let mut row = ConstraintRow::new();
        row.body_a = Some(0);
        row.j_lin_a = Vector3::unit_z();
        row.rhs = 0.0;
        row.lo = 0.0;

        let mut rows = vec![row];
        let degenerate = solve(&mut rows, &mut bodies, 10);
        assert_eq!(degenerate, 0);
        assert_relative_eq!(bodies[0].linear_velocity.z, 0.0, epsilon = 1e-4);
        assert!(rows[0].lambda > 0.0);
    }

    #[test]
    fn impulse_bounds_are_respected() {
        let mut bodies = vec![unit_body(Vector3::new(0.0, 0.0, -10.0))];
        let mut row = ConstraintRow::new();
        row.body_a = Some(0);
        row.j_lin_a = Vector3::unit_z();
        row.lo = 0.0;
        row.hi = 4.0;

        let mut rows = vec![row];
        solve(&mut rows, &mut bodies, 20);
        assert_relative_eq!(rows[0].lambda, 4.0);
        assert_relative_eq!(bodies[0].linear_velocity.z, -6.0, epsilon = 1e-4);
    }

    #[test]
    fn friction_row_is_bounded_by_normal_impulse() {
        // Body pressed down and sliding along x on a unit-normal contact
        let mut bodies = vec![unit_body(Vector3::new(5.0, 0.0, -1.0))];

        let mut normal = ConstraintRow::new();
        normal.body_a = Some(0);
        normal.j_lin_a = Vector3::unit_z();
        normal.lo = 0.0;

        let mut friction = ConstraintRow::new();
        friction.body_a = Some(0);
        friction.j_lin_a = Vector3::unit_x();
        friction.friction_of = Some(0);
        friction.friction_scale = 0.5;

        let mut rows = vec![normal, friction];
        solve(&mut rows, &mut bodies, 20);

        // Normal impulse stops the downward motion; friction can remove
        // at most mu times that impulse from the tangential motion
        assert_relative_eq!(rows[0].lambda, 1.0, epsilon = 1e-4);
        assert!(rows[1].lambda.abs() <= 0.5 + 1e-4);
        assert_relative_eq!(bodies[0].linear_velocity.x, 4.5, epsilon = 1e-3);
    }

    #[test]
    fn massless_row_is_reported_as_degenerate() {
        let mut bodies = vec![unit_body(Vector3::zero())];
        let mut row = ConstraintRow::new();
        row.body_a = Some(0);
        // Zero Jacobian: no mass is visible to the row

        let mut rows = vec![row];
        let degenerate = solve(&mut rows, &mut bodies, 5);
        assert_eq!(degenerate, 1);
    }
}
