//! Permission tables deciding which contacts are expected and suppressed.

pub use self::allowed_collision::AllowedCollisionMatrix;
pub use self::self_collision::SelfCollisionMatrix;
pub use self::touch::{asymmetric_link_pairs, AllowedTouch};

mod allowed_collision;
mod self_collision;
mod touch;
