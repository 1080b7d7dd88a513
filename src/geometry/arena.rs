use crate::math::{Point, Real};
use slab::Slab;
use std::collections::HashMap;

use super::{Primitive, PrimitiveBlueprint, PrimitiveHandle, PrimitiveOwner};

/// The vertex and index buffers of a mesh primitive, padding included.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MeshBuffers {
    /// The padded vertices.
    pub vertices: Vec<Point<Real>>,
    /// Three vertex indices per triangle.
    pub indices: Vec<[u32; 3]>,
}

/// Mesh buffers of an arena, keyed by the handle of the primitive using them.
#[derive(Clone, Debug, Default)]
pub struct MeshStorage {
    meshes: HashMap<PrimitiveHandle, MeshBuffers>,
}

impl MeshStorage {
    /// The buffers of the mesh primitive `handle`.
    pub fn get(&self, handle: PrimitiveHandle) -> Option<&MeshBuffers> {
        self.meshes.get(&handle)
    }

    /// The number of meshes stored.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Returns `true` if no mesh is stored.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// The owner of every primitive of one environment.
///
/// Primitives are referred to by [`PrimitiveHandle`] everywhere else.
/// [`PrimitiveArena::release`] is the only way a primitive (and its mesh
/// buffers) is destroyed.
#[derive(Default)]
pub struct PrimitiveArena {
    primitives: Slab<Primitive>,
    meshes: MeshStorage,
}

impl PrimitiveArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new primitive and returns its handle.
    pub fn insert(
        &mut self,
        blueprint: PrimitiveBlueprint,
        owner: PrimitiveOwner,
    ) -> PrimitiveHandle {
        let PrimitiveBlueprint {
            geometry,
            shape,
            local_frame,
            mesh,
        } = blueprint;
        let key = self
            .primitives
            .insert(Primitive::new(geometry, shape, local_frame, owner));
        let handle = PrimitiveHandle(key as u32);

        if let Some(mesh) = mesh {
            let _ = self.meshes.meshes.insert(handle, mesh);
        }

        handle
    }

    /// Destroys the primitive `handle` and its mesh buffers.
    ///
    /// Returns the primitive's owner, or `None` if `handle` was not alive.
    pub fn release(&mut self, handle: PrimitiveHandle) -> Option<PrimitiveOwner> {
        let primitive = self.primitives.try_remove(handle.0 as usize)?;
        let _ = self.meshes.meshes.remove(&handle);
        Some(primitive.owner)
    }

    /// Destroys every primitive from `handles`.
    pub fn release_all(&mut self, handles: impl IntoIterator<Item = PrimitiveHandle>) {
        for handle in handles {
            let _ = self.release(handle);
        }
    }

    /// The primitive identified by `handle`.
    pub fn get(&self, handle: PrimitiveHandle) -> Option<&Primitive> {
        self.primitives.get(handle.0 as usize)
    }

    /// A mutable reference to the primitive identified by `handle`.
    pub fn get_mut(&mut self, handle: PrimitiveHandle) -> Option<&mut Primitive> {
        self.primitives.get_mut(handle.0 as usize)
    }

    /// Returns `true` if `handle` identifies a live primitive.
    pub fn contains(&self, handle: PrimitiveHandle) -> bool {
        self.primitives.contains(handle.0 as usize)
    }

    /// The number of live primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Returns `true` if this arena has no primitive.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// The mesh buffers of this arena.
    pub fn meshes(&self) -> &MeshStorage {
        &self.meshes
    }

    /// Builds an independent copy of the primitive `handle`, ready to be
    /// inserted into any arena.
    ///
    /// The backend shape is rebuilt from the primitive's geometry and mesh
    /// buffers, so nothing is shared with the source arena.
    pub fn blueprint_of(&self, handle: PrimitiveHandle) -> Option<PrimitiveBlueprint> {
        let primitive = self.get(handle)?;
        let mesh = self.meshes.get(handle).cloned();
        let shape = primitive.geometry.to_shared_shape(mesh.as_ref())?;
        Some(PrimitiveBlueprint {
            geometry: primitive.geometry.clone(),
            shape,
            local_frame: primitive.local_frame,
            mesh,
        })
    }

    /// Copies the primitive `handle` of `self` into `target`, keeping its pose.
    pub fn duplicate_into(
        &self,
        handle: PrimitiveHandle,
        target: &mut PrimitiveArena,
        owner: PrimitiveOwner,
    ) -> Option<PrimitiveHandle> {
        let pose = *self.get(handle)?.pose();
        let blueprint = self.blueprint_of(handle)?;
        let copy = target.insert(blueprint, owner);
        if let Some(primitive) = target.get_mut(copy) {
            primitive.set_pose(pose);
        }
        Some(copy)
    }
}
