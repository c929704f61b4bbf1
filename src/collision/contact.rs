use crate::math::Vector3;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Surface material parameters for a contact.
///
/// The caller fills these in before running the narrow phase; they are
/// stamped onto every generated contact and consumed when the contact is
/// turned into a joint.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SurfaceParams {
    /// Coulomb friction coefficient, >= 0
    pub friction: f32,

    /// Per-contact error-reduction override for soft surfaces
    pub soft_erp: Option<f32>,

    /// Per-contact constraint-force-mixing override for soft surfaces
    pub soft_cfm: Option<f32>,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            friction: 0.5,
            soft_erp: None,
            soft_cfm: None,
        }
    }
}

impl SurfaceParams {
    /// Creates frictional surface parameters with no softness overrides
    pub fn with_friction(friction: f32) -> Self {
        Self {
            friction,
            ..Default::default()
        }
    }
}

/// A single contact point between two geoms.
///
/// The normal points from the second geom toward the first, so pushing
/// the first geom along the normal separates the pair. Depth is the
/// penetration along the normal and is positive for touching contacts.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Contact {
    /// Contact position in world space
    pub position: Vector3,

    /// Unit contact normal in world space
    pub normal: Vector3,

    /// Penetration depth along the normal
    pub depth: f32,

    /// Surface parameters stamped by the caller
    pub surface: SurfaceParams,
}

impl Contact {
    /// Returns a copy with the normal reversed, for swapped geom order
    pub(crate) fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            ..*self
        }
    }
}
