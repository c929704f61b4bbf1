mod box_box;
mod contact;
pub mod narrow_phase;
mod space;

pub use self::contact::{Contact, SurfaceParams};
pub use self::narrow_phase::collide;
pub use self::space::{Geom, Space, SpaceId, SpaceKind};
