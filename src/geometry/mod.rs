//! Backend collision primitives and their storage.

pub use self::arena::{MeshBuffers, MeshStorage, PrimitiveArena};
pub use self::factory::{
    build_primitive, build_static_primitive, pad_mesh_vertices, PrimitiveBlueprint,
};
pub use self::primitive::{Primitive, PrimitiveGeometry, PrimitiveHandle, PrimitiveOwner};

mod arena;
mod factory;
mod primitive;
