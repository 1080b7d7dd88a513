use crate::broad_phase::SortedAxesIndex;
use crate::geometry::PrimitiveHandle;

/// A named collection of world primitives.
///
/// Primitives added in batches go to the broad-phase index, the others to a
/// flat list tested exhaustively.
#[derive(Clone, Debug, Default)]
pub struct CollisionNamespace {
    pub(crate) name: String,
    pub(crate) index: SortedAxesIndex,
    pub(crate) simple: Vec<PrimitiveHandle>,
}

impl CollisionNamespace {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// The namespace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The broad-phase index of this namespace.
    pub fn index(&self) -> &SortedAxesIndex {
        &self.index
    }

    /// The primitives not part of the index.
    pub fn simple_primitives(&self) -> &[PrimitiveHandle] {
        &self.simple
    }

    /// Every primitive of this namespace.
    pub fn primitives(&self) -> impl Iterator<Item = PrimitiveHandle> + '_ {
        self.simple.iter().copied().chain(self.index.handles())
    }

    /// The number of primitives of this namespace.
    pub fn len(&self) -> usize {
        self.simple.len() + self.index.len()
    }

    /// Returns `true` if this namespace has no primitive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
