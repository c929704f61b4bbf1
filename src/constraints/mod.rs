mod contact;
mod group;
mod joint;
mod plane2d;

pub use self::contact::ContactJoint;
pub use self::group::JointGroup;
pub use self::joint::Joint;
pub use self::plane2d::{MotorParams, Plane2dJoint};

pub(crate) use self::joint::RowContext;
