pub mod config;
pub mod storage;
pub mod world;
pub(crate) mod solver;

pub use self::config::WorldConfig;
pub use self::storage::{Handle, HandleStorage};
pub use self::world::World;

/// A unique identifier for a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

/// A unique identifier for a persistent joint in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointHandle(pub(crate) u32);

/// A unique identifier for a geom in a collision space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeomHandle(pub(crate) u32);

impl Handle for BodyHandle {
    const KIND: &'static str = "body";

    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(&self) -> u32 {
        self.0
    }
}

impl Handle for JointHandle {
    const KIND: &'static str = "joint";

    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(&self) -> u32 {
        self.0
    }
}

impl Handle for GeomHandle {
    const KIND: &'static str = "geom";

    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(&self) -> u32 {
        self.0
    }
}
