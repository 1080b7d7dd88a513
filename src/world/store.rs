use crate::backend::{ContactBuffer, NarrowPhase};
use crate::environment::EnvironmentError;
use crate::geometry::{
    build_primitive, build_static_primitive, Primitive, PrimitiveArena, PrimitiveBlueprint,
    PrimitiveHandle, PrimitiveOwner,
};
use crate::math::{Isometry, Real};
use crate::parry::bounding_volume::BoundingVolume;
use crate::shapes::{Shape, StaticShape};
use std::collections::BTreeMap;

use super::{CollisionNamespace, EnvironmentObjects, ObjectShape};

/// The world obstacles of an environment, grouped in namespaces.
#[derive(Default)]
pub struct WorldGeometry {
    arena: PrimitiveArena,
    namespaces: BTreeMap<String, CollisionNamespace>,
    objects: EnvironmentObjects,
}

impl WorldGeometry {
    /// An empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// The primitives of every world obstacle.
    pub fn arena(&self) -> &PrimitiveArena {
        &self.arena
    }

    /// The registry of the world objects.
    pub fn objects(&self) -> &EnvironmentObjects {
        &self.objects
    }

    /// Every namespace, in name order.
    pub fn namespaces(&self) -> impl Iterator<Item = &CollisionNamespace> {
        self.namespaces.values()
    }

    /// The namespace named `ns`.
    pub fn namespace(&self, ns: &str) -> Option<&CollisionNamespace> {
        self.namespaces.get(ns)
    }

    fn namespace_mut(&mut self, ns: &str) -> &mut CollisionNamespace {
        self.namespaces
            .entry(ns.to_string())
            .or_insert_with(|| CollisionNamespace::new(ns.to_string()))
    }

    fn insert(
        &mut self,
        ns: &str,
        blueprint: PrimitiveBlueprint,
        shape: ObjectShape,
    ) -> (PrimitiveHandle, u64) {
        let pose = match &shape {
            ObjectShape::Dynamic { pose, .. } => Some(*pose),
            ObjectShape::Static(_) => None,
        };
        let object = self.objects.add(ns, shape);
        let handle = self.arena.insert(
            blueprint,
            PrimitiveOwner::World {
                namespace: ns.to_string(),
                object,
            },
        );
        if let (Some(pose), Some(primitive)) = (pose, self.arena.get_mut(handle)) {
            primitive.set_pose(pose);
        }
        (handle, object)
    }

    /// Adds one object placed at `pose` to the namespace `ns`.
    ///
    /// Returns the identifier of the object in the registry.
    pub fn add_object(
        &mut self,
        ns: &str,
        shape: Shape,
        pose: Isometry<Real>,
    ) -> Result<u64, EnvironmentError> {
        let blueprint = build_primitive(&shape, 1.0, 0.0).ok_or_else(|| {
            EnvironmentError::UnsupportedShape {
                owner: ns.to_string(),
            }
        })?;
        let (handle, object) = self.insert(ns, blueprint, ObjectShape::Dynamic { shape, pose });
        self.namespace_mut(ns).simple.push(handle);
        Ok(object)
    }

    /// Adds one untransformable object to the namespace `ns`.
    pub fn add_static_object(
        &mut self,
        ns: &str,
        shape: StaticShape,
    ) -> Result<u64, EnvironmentError> {
        let blueprint = build_static_primitive(&shape).ok_or_else(|| {
            EnvironmentError::UnsupportedShape {
                owner: ns.to_string(),
            }
        })?;
        let (handle, object) = self.insert(ns, blueprint, ObjectShape::Static(shape));
        self.namespace_mut(ns).simple.push(handle);
        Ok(object)
    }

    /// Adds a batch of objects to the broad-phase index of the namespace `ns`.
    ///
    /// The namespace is created even if `shapes` is empty. Nothing is added
    /// if one of the shapes is not supported.
    pub fn add_objects(
        &mut self,
        ns: &str,
        shapes: Vec<Shape>,
        poses: Vec<Isometry<Real>>,
    ) -> Result<Vec<u64>, EnvironmentError> {
        if shapes.len() != poses.len() {
            return Err(EnvironmentError::ShapePoseCountMismatch {
                shapes: shapes.len(),
                poses: poses.len(),
            });
        }

        let blueprints = shapes
            .iter()
            .map(|shape| {
                build_primitive(shape, 1.0, 0.0).ok_or_else(|| EnvironmentError::UnsupportedShape {
                    owner: ns.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let _ = self.namespace_mut(ns);
        self.objects.add_namespace(ns);

        let mut ids = Vec::with_capacity(shapes.len());
        for ((blueprint, shape), pose) in blueprints.into_iter().zip(shapes).zip(poses) {
            let (handle, object) = self.insert(ns, blueprint, ObjectShape::Dynamic { shape, pose });
            if let Some(aabb) = self.arena.get(handle).map(|p| *p.aabb()) {
                self.namespace_mut(ns).index.register(handle, aabb);
            }
            ids.push(object);
        }

        self.namespace_mut(ns).index.setup();
        Ok(ids)
    }

    /// Removes every namespace.
    pub fn clear(&mut self) {
        self.namespaces.clear();
        self.arena = PrimitiveArena::new();
        self.objects.clear();
    }

    /// Removes the namespace `ns` and all its objects.
    pub fn clear_namespace(&mut self, ns: &str) {
        if let Some(namespace) = self.namespaces.remove(ns) {
            self.arena.release_all(namespace.primitives().collect::<Vec<_>>());
        }
        self.objects.clear_namespace(ns);
    }

    /// Removes every object touching `shape` placed at `pose`.
    ///
    /// Returns the number of objects removed.
    pub fn remove_colliding_objects(
        &mut self,
        shape: &Shape,
        pose: Isometry<Real>,
        narrow_phase: &dyn NarrowPhase,
    ) -> Result<usize, EnvironmentError> {
        let blueprint = build_primitive(shape, 1.0, 0.0).ok_or_else(|| {
            EnvironmentError::UnsupportedShape {
                owner: "probe".to_string(),
            }
        })?;
        let mut probes = PrimitiveArena::new();
        let probe = probes.insert(blueprint, PrimitiveOwner::Probe);
        let probe = probes.get_mut(probe).map(|p| {
            p.set_pose(pose);
            &*p
        });

        Ok(probe.map_or(0, |probe| self.remove_touching(probe, narrow_phase)))
    }

    /// Removes every object touching the untransformable `shape`.
    pub fn remove_colliding_static_objects(
        &mut self,
        shape: &StaticShape,
        narrow_phase: &dyn NarrowPhase,
    ) -> Result<usize, EnvironmentError> {
        let blueprint = build_static_primitive(shape).ok_or_else(|| {
            EnvironmentError::UnsupportedShape {
                owner: "probe".to_string(),
            }
        })?;
        let mut probes = PrimitiveArena::new();
        let probe = probes.insert(blueprint, PrimitiveOwner::Probe);
        Ok(probes
            .get(probe)
            .map_or(0, |probe| self.remove_touching(probe, narrow_phase)))
    }

    fn touches(
        &self,
        probe: &Primitive,
        handle: PrimitiveHandle,
        narrow_phase: &dyn NarrowPhase,
    ) -> bool {
        let primitive = match self.arena.get(handle) {
            Some(primitive) => primitive,
            None => return false,
        };
        if !probe.aabb().intersects(primitive.aabb()) {
            return false;
        }

        let mut contacts = ContactBuffer::new();
        narrow_phase.collide(probe, primitive, 1, &mut contacts);
        !contacts.is_empty()
    }

    fn remove_touching(&mut self, probe: &Primitive, narrow_phase: &dyn NarrowPhase) -> usize {
        let mut removed = vec![];

        for namespace in self.namespaces.values() {
            for handle in namespace.primitives() {
                if self.touches(probe, handle, narrow_phase) {
                    removed.push((namespace.name.clone(), handle));
                }
            }
        }

        for (ns, handle) in &removed {
            let namespace = self.namespace_mut(ns);
            if let Some(i) = namespace.simple.iter().position(|h| h == handle) {
                let _ = namespace.simple.remove(i);
            } else if let Some(entry) =
                namespace.index.entries().iter().find(|e| e.handle == *handle)
            {
                let aabb = entry.aabb;
                namespace.index.unregister(*handle, &aabb);
            }

            if let Some(PrimitiveOwner::World { object, .. }) = self.arena.release(*handle) {
                let _ = self.objects.remove(ns, object);
            }
        }

        removed.len()
    }

    /// Copies every namespace, primitive and registered object into a new world.
    ///
    /// The backend shapes of the copy are rebuilt from the primitives'
    /// geometry, nothing is shared with `self`.
    pub fn duplicated(&self) -> Self {
        let mut result = Self {
            objects: self.objects.clone(),
            ..Self::default()
        };

        for (name, namespace) in &self.namespaces {
            let mut copy = CollisionNamespace::new(name.clone());

            for handle in &namespace.simple {
                if let Some(h) = self.duplicate_primitive(*handle, &mut result.arena) {
                    copy.simple.push(h);
                }
            }

            for handle in namespace.index.handles() {
                if let Some(h) = self.duplicate_primitive(handle, &mut result.arena) {
                    if let Some(aabb) = result.arena.get(h).map(|p| *p.aabb()) {
                        copy.index.register(h, aabb);
                    }
                }
            }
            copy.index.setup();

            let _ = result.namespaces.insert(name.clone(), copy);
        }

        result
    }

    fn duplicate_primitive(
        &self,
        handle: PrimitiveHandle,
        target: &mut PrimitiveArena,
    ) -> Option<PrimitiveHandle> {
        let owner = self.arena.get(handle)?.owner().clone();
        let copy = self.arena.duplicate_into(handle, target, owner);
        if copy.is_none() {
            log::error!("Failed to duplicate world primitive {:?}.", handle);
        }
        copy
    }
}
