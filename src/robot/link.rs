use crate::geometry::PrimitiveHandle;
use crate::math::Real;
use crate::permissions::AllowedTouch;
use smallvec::SmallVec;
use std::collections::HashMap;

/// The collision geometry bound to one robot link.
///
/// `primitives[0]` is the link's own shape, the following ones are the
/// shapes of its attached bodies, in order.
#[derive(Clone, Debug)]
pub struct LinkGeometry {
    pub(crate) name: String,
    pub(crate) index: usize,
    pub(crate) enabled: bool,
    pub(crate) primitives: SmallVec<[PrimitiveHandle; 4]>,
    pub(crate) attached_ordinals: HashMap<PrimitiveHandle, usize>,
    pub(crate) allowed_touch: AllowedTouch,
    pub(crate) padding: Real,
}

impl LinkGeometry {
    pub(crate) fn new(name: String, index: usize, link_primitive: PrimitiveHandle) -> Self {
        let mut primitives = SmallVec::new();
        primitives.push(link_primitive);
        Self {
            name,
            index,
            enabled: true,
            primitives,
            attached_ordinals: HashMap::new(),
            allowed_touch: AllowedTouch::default(),
            padding: 0.0,
        }
    }

    /// The link name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collision link index of this link.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether collisions are checked for this link.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// All the primitives of this link, its own shape first.
    pub fn primitives(&self) -> &[PrimitiveHandle] {
        &self.primitives
    }

    /// The primitive of the link's own shape.
    pub fn link_primitive(&self) -> PrimitiveHandle {
        self.primitives[0]
    }

    /// The primitives of the attached-body shapes.
    pub fn attached_primitives(&self) -> &[PrimitiveHandle] {
        &self.primitives[1..]
    }

    /// The 1-based ordinal of the attached body owning `primitive`.
    pub fn attached_ordinal(&self, primitive: PrimitiveHandle) -> Option<usize> {
        self.attached_ordinals.get(&primitive).copied()
    }

    /// The allowed-touch table of this link and its attached bodies.
    pub fn allowed_touch(&self) -> &AllowedTouch {
        &self.allowed_touch
    }

    /// The padding the link's own shape was built with.
    pub fn padding(&self) -> Real {
        self.padding
    }
}
