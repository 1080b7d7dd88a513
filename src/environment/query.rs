use crate::backend::{ContactBuffer, MAX_BACKEND_CONTACTS};
use crate::broad_phase::{sweep_and_prune, IndexEntry};
use crate::geometry::{build_primitive, Primitive, PrimitiveHandle};
use crate::math::{Isometry, Point, Real};
use crate::parry::bounding_volume::BoundingVolume;
use crate::parry::shape::SharedShape;
use crate::robot::LinkGeometry;
use crate::world::CollisionNamespace;

use super::{AllowedContact, CollisionEnvironment, Contact, ContactReport};

// An allowed-contact region turned into a backend shape once per query.
struct Region<'a> {
    contact: &'a AllowedContact,
    shape: SharedShape,
    pose: Isometry<Real>,
}

// Who the two sides of a tested pair belong to.
struct PairOwners<'a> {
    link1: &'a str,
    link1_attached_body: usize,
    link2: Option<&'a str>,
    link2_attached_body: usize,
    // Set when the second side is a world object.
    namespace: Option<&'a str>,
}

/// The state of one collision query, from the self-collision phase to the
/// end of the world phase.
pub(crate) struct CollisionQuery<'a> {
    env: &'a CollisionEnvironment,
    regions: Vec<Region<'a>>,
    collect: bool,
    max_count: usize,
    contacts: Vec<Contact>,
    collides: bool,
    done: bool,
}

impl<'a> CollisionQuery<'a> {
    /// A query stopping at the first contact found.
    pub fn boolean(env: &'a CollisionEnvironment) -> Self {
        Self {
            env,
            regions: vec![],
            collect: false,
            max_count: 0,
            contacts: vec![],
            collides: false,
            done: false,
        }
    }

    /// A query gathering up to `max_count` contacts (`0` for no limit),
    /// ignoring those expected by `allowed`.
    pub fn gathering(
        env: &'a CollisionEnvironment,
        allowed: &'a [AllowedContact],
        max_count: usize,
    ) -> Self {
        let regions = allowed
            .iter()
            .filter_map(|contact| match build_primitive(&contact.bound, 1.0, 0.0) {
                Some(blueprint) => Some(Region {
                    contact,
                    pose: contact.pose * blueprint.local_frame,
                    shape: blueprint.shape,
                }),
                None => {
                    log::warn!("Ignoring an allowed contact region with an unsupported bound.");
                    None
                }
            })
            .collect();

        Self {
            regions,
            collect: true,
            max_count,
            ..Self::boolean(env)
        }
    }

    /// Returns `true` once no more pair needs to be tested.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether a contact was found.
    pub fn collides(&self) -> bool {
        self.collides
    }

    pub fn into_report(self) -> ContactReport {
        let terminated_early = self.max_count > 0 && self.contacts.len() >= self.max_count;
        ContactReport {
            collides: self.collides,
            contacts: self.contacts,
            terminated_early,
        }
    }

    fn pair_limit(&self) -> usize {
        if !self.collect {
            1
        } else if self.max_count == 0 {
            MAX_BACKEND_CONTACTS
        } else {
            self.max_count.min(MAX_BACKEND_CONTACTS)
        }
    }

    fn is_full(&self) -> bool {
        self.max_count > 0 && self.contacts.len() >= self.max_count
    }

    fn in_allowed_region(&self, position: &Point<Real>, depth: Real, link: &str) -> bool {
        self.regions.iter().any(|region| {
            region
                .contact
                .permits(&*region.shape.0, &region.pose, position, depth, link)
        })
    }

    // Runs the narrow-phase on a pair that passed every permission check.
    // Returns `true` if at least one contact was recorded.
    fn collide(&mut self, g1: &Primitive, g2: &Primitive, owners: &PairOwners) -> bool {
        let mut buffer = ContactBuffer::new();
        self.env
            .narrow_phase
            .collide(g1, g2, self.pair_limit(), &mut buffer);

        if buffer.is_empty() {
            return false;
        }

        if !self.collect {
            self.collides = true;
            self.done = true;
            return true;
        }

        let mut recorded = false;
        for contact in &buffer {
            if self.is_full() {
                break;
            }

            // Only robot-vs-world contacts can be expected.
            if owners.namespace.is_some()
                && self.in_allowed_region(&contact.position, contact.depth, owners.link1)
            {
                continue;
            }

            self.contacts.push(Contact {
                position: contact.position,
                normal: contact.normal,
                depth: contact.depth,
                link1: Some(owners.link1.to_string()),
                link2: owners.link2.map(str::to_string),
                link1_attached_body: owners.link1_attached_body,
                link2_attached_body: owners.link2_attached_body,
                object_name: owners.namespace.map(str::to_string),
            });
            self.collides = true;
            recorded = true;
        }

        if self.is_full() {
            self.done = true;
        }

        recorded
    }

    /// Tests every pair of overlapping primitives of the enabled links.
    pub fn run_self_phase(&mut self) {
        let env = self.env;
        let robot = &env.robot;
        let mut entries: Vec<IndexEntry> = robot
            .links()
            .iter()
            .filter(|link| link.is_enabled())
            .flat_map(|link| link.primitives().iter().copied())
            .filter_map(|handle| {
                robot.arena().get(handle).map(|p| IndexEntry {
                    handle,
                    aabb: *p.aabb(),
                })
            })
            .collect();

        sweep_and_prune(&mut entries, |h1, h2| {
            self.self_pair(h1, h2);
            !self.done
        });
    }

    fn self_pair(&mut self, h1: PrimitiveHandle, h2: PrimitiveHandle) {
        let env = self.env;
        let robot = &env.robot;
        let (link1, link2) = match (robot.owner_of(h1), robot.owner_of(h2)) {
            (Some((link1, _)), Some((link2, _))) => (link1, link2),
            _ => {
                log::warn!("Robot primitive {:?} or {:?} has no owning link.", h1, h2);
                return;
            }
        };
        let ordinals = (attached_ordinal(link1, h1), attached_ordinal(link2, h2));
        let (ordinal1, ordinal2) = match ordinals {
            (Some(o1), Some(o2)) => (o1, o2),
            _ => return,
        };

        let suppressed = match (ordinal1, ordinal2) {
            (0, 0) => {
                let allowed12 = link1.allowed_touch().link_allows(link2.index());
                let allowed21 = link2.allowed_touch().link_allows(link1.index());
                if allowed12 != allowed21 {
                    log::warn!(
                        "Links '{}' and '{}' disagree on whether they may touch.",
                        link1.name(),
                        link2.name()
                    );
                }
                allowed12 || allowed21
            }
            (0, body) => link2.allowed_touch().body_allows(body, link1.index()),
            (body, 0) => link1.allowed_touch().body_allows(body, link2.index()),
            _ => link1.index() == link2.index(),
        };

        if suppressed {
            return;
        }

        let (g1, g2) = match (robot.arena().get(h1), robot.arena().get(h2)) {
            (Some(g1), Some(g2)) => (g1, g2),
            _ => return,
        };
        let owners = PairOwners {
            link1: link1.name(),
            link1_attached_body: ordinal1,
            link2: Some(link2.name()),
            link2_attached_body: ordinal2,
            namespace: None,
        };
        let _ = self.collide(g1, g2, &owners);
    }

    /// Tests the enabled links against every namespace, in name order.
    pub fn run_world_phase(&mut self) {
        let env = self.env;
        for namespace in env.world.namespaces() {
            if self.done {
                break;
            }
            self.test_namespace(namespace);
        }
    }

    fn test_namespace(&mut self, namespace: &'a CollisionNamespace) {
        let env = self.env;
        let robot = &env.robot;
        let world = env.world.arena();

        for link in robot.links().iter().rev() {
            if !link.is_enabled() {
                continue;
            }

            for handle in link.primitives() {
                if self.done {
                    return;
                }

                let ordinal = attached_ordinal(link, *handle).unwrap_or(0);
                if !self.world_check_required(namespace.name(), link, ordinal) {
                    continue;
                }

                let g1 = match robot.arena().get(*handle) {
                    Some(g1) => g1,
                    None => continue,
                };
                let owners = PairOwners {
                    link1: link.name(),
                    link1_attached_body: ordinal,
                    link2: None,
                    link2_attached_body: 0,
                    namespace: Some(namespace.name()),
                };

                let mut hit = false;
                if !namespace.index().is_empty() {
                    namespace.index().for_each_candidate(g1.aabb(), |entry| {
                        if let Some(g2) = world.get(entry.handle) {
                            hit |= self.collide(g1, g2, &owners);
                        }
                        !self.done
                    });
                }

                for h2 in namespace.simple_primitives().iter().rev() {
                    if self.done {
                        break;
                    }
                    if let Some(g2) = world.get(*h2) {
                        if g1.aabb().intersects(g2.aabb()) {
                            hit |= self.collide(g1, g2, &owners);
                        }
                    }
                }

                if hit && env.verbose {
                    log::info!(
                        "Collision between namespace '{}' and link '{}'.",
                        namespace.name(),
                        link.name()
                    );
                    if ordinal > 0 {
                        log::info!(
                            "The collision involves attached body {} of link '{}'.",
                            ordinal,
                            link.name()
                        );
                    }
                }
            }
        }
    }

    // With an allowed-collision matrix active, pairs marked allowed are skipped.
    fn world_check_required(&self, ns: &str, link: &LinkGeometry, ordinal: usize) -> bool {
        let robot = &self.env.robot;
        let matrix = match robot.collision_matrix_override() {
            Some(matrix) => matrix,
            None => return true,
        };

        let name = match ordinal.checked_sub(1) {
            Some(body) => robot
                .attached_bodies_of(link.name())
                .get(body)
                .map_or(link.name(), |b| b.name.as_str()),
            None => link.name(),
        };

        match matrix.allowed(ns, name) {
            Some(allowed) => !allowed,
            None => {
                log::error!(
                    "The allowed collision matrix has no entry for '{}' or '{}'.",
                    ns,
                    name
                );
                false
            }
        }
    }
}

// `0` for the link's own primitive, the 1-based attached body ordinal otherwise.
fn attached_ordinal(link: &LinkGeometry, handle: PrimitiveHandle) -> Option<usize> {
    if handle == link.link_primitive() {
        return Some(0);
    }

    let ordinal = link.attached_ordinal(handle);
    if ordinal.is_none() {
        log::warn!(
            "Primitive {:?} of link '{}' belongs to no attached body.",
            handle,
            link.name()
        );
    }
    ordinal
}
