//! The collision geometry of the robot: links, attached bodies and padding.

pub use self::geometry::RobotGeometry;
pub use self::link::LinkGeometry;
pub use self::params::{RobotCollisionParams, ATTACHED_PADDING_KEY};

mod geometry;
mod link;
mod params;
