use crate::collision::Contact;
use crate::constraints::RowContext;
use crate::core::solver::ConstraintRow;
use crate::core::BodyHandle;

/// A transient contact constraint built from one narrow-phase contact.
///
/// The first body matches the contact's first geom, so the contact
/// normal pushes it away from the second. Either body slot may be empty
/// when the geom is static.
pub struct ContactJoint {
    body_a: Option<BodyHandle>,
    body_b: Option<BodyHandle>,
    contact: Contact,
}

impl ContactJoint {
    /// Creates a contact joint between the given bodies
    pub fn new(body_a: Option<BodyHandle>, body_b: Option<BodyHandle>, contact: Contact) -> Self {
        Self {
            body_a,
            body_b,
            contact,
        }
    }

    pub fn body_a(&self) -> Option<BodyHandle> {
        self.body_a
    }

    pub fn body_b(&self) -> Option<BodyHandle> {
        self.body_b
    }

    /// Returns the underlying contact point
    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    pub(crate) fn append_rows(&self, ctx: &RowContext, rows: &mut Vec<ConstraintRow>) {
        let index_a = self.body_a.and_then(|b| ctx.index_of(b));
        let index_b = self.body_b.and_then(|b| ctx.index_of(b));
        if index_a.is_none() && index_b.is_none() {
            return;
        }

        let surface = self.contact.surface;
        let erp = surface.soft_erp.unwrap_or(ctx.erp);
        let cfm = surface.soft_cfm.unwrap_or(ctx.cfm);
        let normal = self.contact.normal;

        let r_a = index_a.map(|i| self.contact.position - ctx.positions[i]);
        let r_b = index_b.map(|i| self.contact.position - ctx.positions[i]);

        // Non-penetration along the normal, biased to remove a fraction
        // of the penetration depth per step
        let mut normal_row = ConstraintRow::new();
        normal_row.body_a = index_a;
        normal_row.body_b = index_b;
        normal_row.j_lin_a = normal;
        normal_row.j_lin_b = -normal;
        if let Some(r) = r_a {
            normal_row.j_ang_a = r.cross(&normal);
        }
        if let Some(r) = r_b {
            normal_row.j_ang_b = -r.cross(&normal);
        }
        normal_row.rhs = erp / ctx.dt * self.contact.depth.max(0.0);
        normal_row.cfm = cfm;
        normal_row.lo = 0.0;
        let normal_index = rows.len();
        rows.push(normal_row);

        if surface.friction <= 0.0 {
            return;
        }

        // Two tangential rows forming a friction pyramid around the
        // normal impulse
        let t1 = normal.any_perpendicular();
        let t2 = normal.cross(&t1);
        for tangent in [t1, t2] {
            if tangent.is_zero() {
                continue;
            }
            let mut row = ConstraintRow::new();
            row.body_a = index_a;
            row.body_b = index_b;
            row.j_lin_a = tangent;
            row.j_lin_b = -tangent;
            if let Some(r) = r_a {
                row.j_ang_a = r.cross(&tangent);
            }
            if let Some(r) = r_b {
                row.j_ang_b = -r.cross(&tangent);
            }
            row.cfm = ctx.cfm;
            row.friction_of = Some(normal_index);
            row.friction_scale = surface.friction;
            rows.push(row);
        }
    }
}
