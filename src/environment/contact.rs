use crate::math::{Isometry, Point, Real, Vector};
use crate::parry::query::{DefaultQueryDispatcher, QueryDispatcher};
use crate::parry::shape::{Ball, Shape as BackendShape};
use crate::shapes::Shape;

/// A contact found by a collision query.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Contact {
    /// The contact point, in world-space.
    pub position: Point<Real>,
    /// The contact normal, in world-space.
    pub normal: Vector<Real>,
    /// The penetration depth.
    pub depth: Real,
    /// The first robot link involved.
    pub link1: Option<String>,
    /// The second robot link involved, `None` for a world object.
    pub link2: Option<String>,
    /// `0` if `link1` itself is in contact, `k` for its `k`-th attached body.
    pub link1_attached_body: usize,
    /// `0` if `link2` itself is in contact, `k` for its `k`-th attached body.
    pub link2_attached_body: usize,
    /// The namespace of the world object involved, if any.
    pub object_name: Option<String>,
}

/// A region where shallow contacts with some links are expected and ignored.
#[derive(Clone, Debug)]
pub struct AllowedContact {
    /// The region, as a shape.
    pub bound: Shape,
    /// The pose of `bound`.
    pub pose: Isometry<Real>,
    /// Contacts at least this deep are still reported.
    pub depth: Real,
    /// The links allowed to touch inside the region.
    pub links: Vec<String>,
}

impl AllowedContact {
    /// Creates a new allowed-contact region.
    pub fn new(bound: Shape, pose: Isometry<Real>, depth: Real, links: Vec<String>) -> Self {
        Self {
            bound,
            pose,
            depth,
            links,
        }
    }

    /// Returns `true` if a contact at `position` with penetration `depth`
    /// involving `link` is expected in this region.
    pub(crate) fn permits(
        &self,
        region: &dyn BackendShape,
        region_pose: &Isometry<Real>,
        position: &Point<Real>,
        depth: Real,
        link: &str,
    ) -> bool {
        self.depth > depth.abs()
            && self.links.iter().any(|l| l == link)
            && contains_point(region, region_pose, position)
    }
}

// A point is inside a shape if a zero-radius ball placed on it intersects the shape.
fn contains_point(shape: &dyn BackendShape, pose: &Isometry<Real>, point: &Point<Real>) -> bool {
    let pos12 = pose.inv_mul(&Isometry::translation(point.x, point.y, point.z));
    DefaultQueryDispatcher
        .intersection_test(&pos12, shape, &Ball::new(0.0))
        .unwrap_or(false)
}

/// The outcome of a contact query.
///
/// Returned by [`collision_contacts`](super::CollisionEnvironment::collision_contacts).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ContactReport {
    /// Whether at least one contact was found.
    pub collides: bool,
    /// The contacts found.
    pub contacts: Vec<Contact>,
    /// Whether the query stopped before testing every pair because the
    /// requested number of contacts was reached.
    pub terminated_early: bool,
}
