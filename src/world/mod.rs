//! World obstacles, grouped in independently managed namespaces.

pub use self::namespace::CollisionNamespace;
pub use self::objects::{EnvironmentObject, EnvironmentObjects, ObjectShape};
pub use self::store::WorldGeometry;

mod namespace;
mod objects;
mod store;
