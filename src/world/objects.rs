use crate::math::{Isometry, Real};
use crate::shapes::{Shape, StaticShape};
use std::collections::BTreeMap;

/// The shape of a world object, as it was given to the environment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ObjectShape {
    /// A shape placed at some pose.
    Dynamic {
        /// The object shape.
        shape: Shape,
        /// The object pose.
        pose: Isometry<Real>,
    },
    /// An untransformable shape.
    Static(StaticShape),
}

/// One world object.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct EnvironmentObject {
    /// The identifier of this object, unique within its environment.
    pub id: u64,
    /// The object shape.
    pub shape: ObjectShape,
}

/// The registry of the world objects of an environment, by namespace.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct EnvironmentObjects {
    namespaces: BTreeMap<String, Vec<EnvironmentObject>>,
    next_id: u64,
}

impl EnvironmentObjects {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The name of every namespace, in order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(|ns| ns.as_str())
    }

    /// Returns `true` if the namespace `ns` exists.
    pub fn has_namespace(&self, ns: &str) -> bool {
        self.namespaces.contains_key(ns)
    }

    /// The objects of the namespace `ns`, in insertion order.
    pub fn objects(&self, ns: &str) -> &[EnvironmentObject] {
        self.namespaces.get(ns).map(|o| &o[..]).unwrap_or(&[])
    }

    /// The object with the identifier `id`.
    pub fn get(&self, ns: &str, id: u64) -> Option<&EnvironmentObject> {
        self.objects(ns).iter().find(|o| o.id == id)
    }

    /// The total number of objects.
    pub fn len(&self) -> usize {
        self.namespaces.values().map(|o| o.len()).sum()
    }

    /// Returns `true` if there is no object.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates the namespace `ns` if it does not exist.
    pub fn add_namespace(&mut self, ns: &str) {
        if !self.namespaces.contains_key(ns) {
            let _ = self.namespaces.insert(ns.to_string(), vec![]);
        }
    }

    /// Registers an object and returns its identifier.
    pub fn add(&mut self, ns: &str, shape: ObjectShape) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.add_namespace(ns);
        if let Some(objects) = self.namespaces.get_mut(ns) {
            objects.push(EnvironmentObject { id, shape });
        }
        id
    }

    /// Removes the object `id` of the namespace `ns`.
    pub fn remove(&mut self, ns: &str, id: u64) -> Option<EnvironmentObject> {
        let objects = self.namespaces.get_mut(ns)?;
        let i = objects.iter().position(|o| o.id == id)?;
        Some(objects.remove(i))
    }

    /// Removes the namespace `ns` and all its objects.
    pub fn clear_namespace(&mut self, ns: &str) {
        let _ = self.namespaces.remove(ns);
    }

    /// Removes every namespace.
    pub fn clear(&mut self) {
        self.namespaces.clear();
    }
}
