mod mass;
mod rigid_body;

pub use self::mass::MassProperties;
pub use self::rigid_body::RigidBody;

use bitflags::bitflags;

bitflags! {
    /// Flags for controlling the behavior of rigid bodies
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BodyFlags: u32 {
        /// Body participates in simulation steps
        const ENABLED = 0x01;

        /// Body is accelerated by world gravity
        const AFFECTED_BY_GRAVITY = 0x02;
    }
}

impl Default for BodyFlags {
    fn default() -> Self {
        BodyFlags::ENABLED | BodyFlags::AFFECTED_BY_GRAVITY
    }
}
