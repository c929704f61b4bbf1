use crate::constraints::{ContactJoint, Plane2dJoint};
use crate::core::solver::ConstraintRow;
use crate::core::BodyHandle;
use crate::math::Vector3;
use std::collections::BTreeMap;

/// Everything a joint needs to turn itself into solver rows
pub(crate) struct RowContext<'a> {
    /// Step size, used to convert force limits into impulse limits
    pub dt: f32,

    /// World error-reduction parameter
    pub erp: f32,

    /// World constraint-force mixing
    pub cfm: f32,

    /// Dense solver index of every enabled body
    pub indices: &'a BTreeMap<BodyHandle, usize>,

    /// Body positions, parallel to the dense indices
    pub positions: &'a [Vector3],
}

impl RowContext<'_> {
    pub fn index_of(&self, body: BodyHandle) -> Option<usize> {
        self.indices.get(&body).copied()
    }
}

/// A constraint between bodies (or between a body and the static world).
///
/// A closed enum: the solver and the world match on the variant rather
/// than dispatching through a trait object, and adding a joint kind
/// means extending every match.
pub enum Joint {
    /// Confines a body to the z = constant plane with optional motors
    Plane2d(Plane2dJoint),

    /// A single contact point, normal force plus Coulomb friction
    Contact(ContactJoint),
}

impl Joint {
    /// Returns the bodies the joint acts on
    pub fn bodies(&self) -> (Option<BodyHandle>, Option<BodyHandle>) {
        match self {
            Joint::Plane2d(j) => (Some(j.body()), None),
            Joint::Contact(j) => (j.body_a(), j.body_b()),
        }
    }

    /// Returns whether the joint acts on the given body
    pub fn involves_body(&self, body: BodyHandle) -> bool {
        let (a, b) = self.bodies();
        a == Some(body) || b == Some(body)
    }

    /// Appends this joint's velocity constraint rows
    pub(crate) fn append_rows(&self, ctx: &RowContext, rows: &mut Vec<ConstraintRow>) {
        match self {
            Joint::Plane2d(j) => j.append_rows(ctx, rows),
            Joint::Contact(j) => j.append_rows(ctx, rows),
        }
    }
}
