use crate::geometry::Primitive;
use crate::math::{Isometry, Point, Real, Vector};
use crate::parry::query::{
    ContactManifold, DefaultQueryDispatcher, PersistentQueryDispatcher, QueryDispatcher,
};
use arrayvec::ArrayVec;

/// The maximum number of contacts generated for a single pair of primitives.
pub const MAX_BACKEND_CONTACTS: usize = 128;

/// The contacts generated for one pair of primitives.
pub type ContactBuffer = ArrayVec<BackendContact, MAX_BACKEND_CONTACTS>;

/// A contact point computed by the narrow-phase, in world-space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BackendContact {
    /// The contact point, on the surface of the first primitive.
    pub position: Point<Real>,
    /// The contact normal, pointing from the first primitive toward the second.
    pub normal: Vector<Real>,
    /// The penetration depth, positive when the primitives overlap.
    pub depth: Real,
}

/// The exact contact computation between two placed primitives.
pub trait NarrowPhase: Send + Sync {
    /// Appends to `out` at most `max_contacts` contacts between `g1` and `g2`.
    ///
    /// Nothing is appended if the primitives do not touch.
    fn collide(
        &self,
        g1: &Primitive,
        g2: &Primitive,
        max_contacts: usize,
        out: &mut ContactBuffer,
    );
}

/// The narrow-phase based on parry's query dispatcher.
#[derive(Copy, Clone, Debug, Default)]
pub struct ParryNarrowPhase;

impl ParryNarrowPhase {
    fn single_contact(&self, g1: &Primitive, g2: &Primitive, out: &mut ContactBuffer) {
        let pos1 = g1.shape_pose();
        let pos12 = pos1.inv_mul(&g2.shape_pose());

        match DefaultQueryDispatcher.contact(&pos12, &*g1.shape().0, &*g2.shape().0, 0.0) {
            Ok(Some(contact)) if contact.dist <= 0.0 => {
                let _ = out.try_push(BackendContact {
                    position: pos1 * contact.point1,
                    normal: pos1 * contact.normal1.into_inner(),
                    depth: -contact.dist,
                });
            }
            Ok(_) => {}
            Err(_) => log::warn!(
                "No contact algorithm between {:?} and {:?}.",
                g1.geometry(),
                g2.geometry()
            ),
        }
    }
}

impl NarrowPhase for ParryNarrowPhase {
    fn collide(
        &self,
        g1: &Primitive,
        g2: &Primitive,
        max_contacts: usize,
        out: &mut ContactBuffer,
    ) {
        if max_contacts == 0 {
            return;
        }

        let pos1 = g1.shape_pose();
        let pos12 = pos1.inv_mul(&g2.shape_pose());
        let mut manifolds: Vec<ContactManifold<(), ()>> = vec![];

        let found = DefaultQueryDispatcher.contact_manifolds(
            &pos12,
            &*g1.shape().0,
            &*g2.shape().0,
            0.0,
            &mut manifolds,
            &mut None,
        );

        if found.is_err() {
            self.single_contact(g1, g2, out);
            return;
        }

        let mut added = 0;
        for manifold in &manifolds {
            let sub1 = manifold.subshape_pos1.unwrap_or_else(Isometry::identity);
            let normal = pos1 * (sub1 * manifold.local_n1);

            for point in manifold.points.iter().filter(|pt| pt.dist <= 0.0) {
                if added == max_contacts || out.is_full() {
                    return;
                }

                out.push(BackendContact {
                    position: pos1 * (sub1 * point.local_p1),
                    normal,
                    depth: -point.dist,
                });
                added += 1;
            }
        }
    }
}
