use crate::math::{Aabb, Isometry, Real, UnitVector, Vector};
use crate::parry::shape::{SharedShape, TriMesh};

use super::MeshBuffers;

/// A stable identifier of a primitive stored in a [`PrimitiveArena`](super::PrimitiveArena).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveHandle(pub(crate) u32);

impl PrimitiveHandle {
    /// Builds a handle from a raw arena index.
    pub fn from_raw(raw: u32) -> Self {
        PrimitiveHandle(raw)
    }

    /// The raw index of this handle inside of its arena.
    pub fn into_raw(self) -> u32 {
        self.0
    }
}

/// Who a primitive belongs to.
///
/// This is what lets a contact between two primitives be attributed back to
/// a robot link, one of its attached bodies, or a world object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrimitiveOwner {
    /// A primitive of the robot.
    Link {
        /// The position of the owning link in the robot geometry store.
        slot: usize,
        /// `0` for the link's own shape, `k` for a shape of its `k`-th attached body.
        attached_body: usize,
    },
    /// A world obstacle.
    World {
        /// The namespace the obstacle lives in.
        namespace: String,
        /// The identifier of the obstacle in the object registry.
        object: u64,
    },
    /// A throwaway primitive used to probe the world.
    Probe,
}

impl PrimitiveOwner {
    /// Returns `true` if this primitive is part of the robot.
    pub fn is_robot(&self) -> bool {
        matches!(self, PrimitiveOwner::Link { .. })
    }
}

/// The geometric description of a primitive, as handed to the backend.
///
/// Unlike the backend shape, this is a plain value that can always be used to
/// build an independent copy of the primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveGeometry {
    /// A ball.
    Ball {
        /// The ball radius, padding included.
        radius: Real,
    },
    /// A cuboid.
    Cuboid {
        /// The half-extents, padding included.
        half_extents: Vector<Real>,
    },
    /// A cylinder aligned with the backend's `y` axis.
    Cylinder {
        /// Half of the cylinder length, padding included.
        half_height: Real,
        /// The cylinder radius, padding included.
        radius: Real,
    },
    /// An infinite half-space.
    HalfSpace {
        /// The outward normal of the half-space boundary.
        normal: UnitVector<Real>,
    },
    /// A triangle mesh, its buffers are kept in the arena's mesh storage.
    TriMesh,
}

impl PrimitiveGeometry {
    /// Builds the backend shape described by `self`.
    ///
    /// `mesh` must be provided for [`PrimitiveGeometry::TriMesh`]. Returns `None`
    /// if the backend rejects the geometry.
    pub fn to_shared_shape(&self, mesh: Option<&MeshBuffers>) -> Option<SharedShape> {
        match self {
            PrimitiveGeometry::Ball { radius } => Some(SharedShape::ball(*radius)),
            PrimitiveGeometry::Cuboid { half_extents } => Some(SharedShape::cuboid(
                half_extents.x,
                half_extents.y,
                half_extents.z,
            )),
            PrimitiveGeometry::Cylinder {
                half_height,
                radius,
            } => Some(SharedShape::cylinder(*half_height, *radius)),
            PrimitiveGeometry::HalfSpace { normal } => Some(SharedShape::halfspace(*normal)),
            PrimitiveGeometry::TriMesh => {
                let mesh = mesh?;
                match TriMesh::new(mesh.vertices.clone(), mesh.indices.clone()) {
                    Ok(trimesh) => Some(SharedShape::new(trimesh)),
                    Err(e) => {
                        log::warn!("The collision backend rejected a mesh: {}", e);
                        None
                    }
                }
            }
        }
    }
}

/// One backend collision geometry together with its placement and its owner.
pub struct Primitive {
    pub(crate) geometry: PrimitiveGeometry,
    pub(crate) shape: SharedShape,
    pub(crate) local_frame: Isometry<Real>,
    pub(crate) pose: Isometry<Real>,
    pub(crate) aabb: Aabb,
    pub(crate) owner: PrimitiveOwner,
}

impl Primitive {
    pub(crate) fn new(
        geometry: PrimitiveGeometry,
        shape: SharedShape,
        local_frame: Isometry<Real>,
        owner: PrimitiveOwner,
    ) -> Self {
        let aabb = shape.compute_aabb(&local_frame);
        Self {
            geometry,
            shape,
            local_frame,
            pose: Isometry::identity(),
            aabb,
            owner,
        }
    }

    /// The geometric description of this primitive.
    pub fn geometry(&self) -> &PrimitiveGeometry {
        &self.geometry
    }

    /// The backend shape of this primitive.
    pub fn shape(&self) -> &SharedShape {
        &self.shape
    }

    /// The owner of this primitive.
    pub fn owner(&self) -> &PrimitiveOwner {
        &self.owner
    }

    /// The pose this primitive was last placed at.
    pub fn pose(&self) -> &Isometry<Real> {
        &self.pose
    }

    /// The pose of the backend shape, i.e., the pose combined with the shape's local frame.
    pub fn shape_pose(&self) -> Isometry<Real> {
        self.pose * self.local_frame
    }

    /// The world-space bounding box of this primitive at its current pose.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Moves this primitive and refreshes its bounding box.
    pub fn set_pose(&mut self, pose: Isometry<Real>) {
        self.pose = pose;
        self.aabb = self.shape.compute_aabb(&self.shape_pose());
    }
}

impl core::fmt::Debug for Primitive {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Primitive")
            .field("geometry", &self.geometry)
            .field("pose", &self.pose)
            .field("aabb", &self.aabb)
            .field("owner", &self.owner)
            .finish()
    }
}
