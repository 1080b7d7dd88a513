use collision_space3d::backend::{BackendContact, ContactBuffer, NarrowPhase};
use collision_space3d::geometry::Primitive;
use collision_space3d::math::Vector;
use collision_space3d::parry::bounding_volume::BoundingVolume;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A narrow-phase reporting `contacts_per_pair` contacts for every pair with
/// overlapping AABBs, and counting how many times it was called.
pub struct CountingNarrowPhase {
    pub contacts_per_pair: usize,
    pub calls: Arc<AtomicUsize>,
}

impl CountingNarrowPhase {
    pub fn new(contacts_per_pair: usize) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let narrow_phase = Self {
            contacts_per_pair,
            calls: calls.clone(),
        };
        (narrow_phase, calls)
    }
}

impl NarrowPhase for CountingNarrowPhase {
    fn collide(
        &self,
        g1: &Primitive,
        g2: &Primitive,
        max_contacts: usize,
        out: &mut ContactBuffer,
    ) {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if !g1.aabb().intersects(g2.aabb()) {
            return;
        }

        for _ in 0..self.contacts_per_pair.min(max_contacts) {
            out.push(BackendContact {
                position: g1.aabb().center(),
                normal: Vector::z(),
                depth: 0.01,
            });
        }
    }
}
