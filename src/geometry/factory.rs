use crate::math::{Isometry, Point, Real, UnitVector, Vector};
use crate::parry::shape::SharedShape;
use crate::shapes::{Mesh, Shape, StaticShape};
use core::f64::consts::FRAC_PI_2;

use super::{MeshBuffers, PrimitiveGeometry};

/// A backend primitive that has not been registered into an arena yet.
pub struct PrimitiveBlueprint {
    pub(crate) geometry: PrimitiveGeometry,
    pub(crate) shape: SharedShape,
    pub(crate) local_frame: Isometry<Real>,
    pub(crate) mesh: Option<MeshBuffers>,
}

impl PrimitiveBlueprint {
    fn new(geometry: PrimitiveGeometry, local_frame: Isometry<Real>) -> Option<Self> {
        let shape = geometry.to_shared_shape(None)?;
        Some(Self {
            geometry,
            shape,
            local_frame,
            mesh: None,
        })
    }

    fn with_mesh(mesh: MeshBuffers) -> Option<Self> {
        let geometry = PrimitiveGeometry::TriMesh;
        let shape = geometry.to_shared_shape(Some(&mesh))?;
        Some(Self {
            geometry,
            shape,
            local_frame: Isometry::identity(),
            mesh: Some(mesh),
        })
    }

    /// The geometric description of the primitive to be created.
    pub fn geometry(&self) -> &PrimitiveGeometry {
        &self.geometry
    }

    /// The padded mesh buffers, if this is a mesh primitive.
    pub fn mesh(&self) -> Option<&MeshBuffers> {
        self.mesh.as_ref()
    }
}

/// The frame mapping the backend cylinder axis (`y`) onto the descriptor axis (`z`).
fn cylinder_frame() -> Isometry<Real> {
    Isometry::rotation(Vector::x() * FRAC_PI_2)
}

/// Builds the backend primitive of a transformable shape, scaled and padded.
///
/// Spheres and cylinders grow their radius by `padding`; boxes and cylinders
/// grow each full extent by `2 * padding`. Meshes are not scaled, their
/// vertices are pushed away from the centroid by [`pad_mesh_vertices`].
///
/// Returns `None` if the shape cannot be represented, e.g., an empty mesh or
/// a negative padding collapsing a primitive to a non-positive size.
pub fn build_primitive(shape: &Shape, scale: Real, padding: Real) -> Option<PrimitiveBlueprint> {
    match shape {
        Shape::Sphere { radius } => PrimitiveBlueprint::new(
            PrimitiveGeometry::Ball {
                radius: positive(radius * scale + padding)?,
            },
            Isometry::identity(),
        ),
        Shape::Box { size } => {
            let full_extents = size * scale + Vector::repeat(padding * 2.0);
            if full_extents.min() <= 0.0 {
                return None;
            }

            PrimitiveBlueprint::new(
                PrimitiveGeometry::Cuboid {
                    half_extents: full_extents / 2.0,
                },
                Isometry::identity(),
            )
        }
        Shape::Cylinder { radius, length } => PrimitiveBlueprint::new(
            PrimitiveGeometry::Cylinder {
                half_height: positive(length * scale + padding * 2.0)? / 2.0,
                radius: positive(radius * scale + padding)?,
            },
            cylinder_frame(),
        ),
        Shape::Mesh(mesh) => {
            if mesh.is_empty() {
                return None;
            }

            PrimitiveBlueprint::with_mesh(MeshBuffers {
                vertices: pad_mesh_vertices(mesh, padding),
                indices: mesh.triangles.clone(),
            })
        }
    }
}

fn positive(value: Real) -> Option<Real> {
    (value > 0.0).then_some(value)
}

/// Builds the backend primitive of a static shape.
///
/// Static shapes are neither scaled nor padded. Returns `None` for a
/// degenerate plane.
pub fn build_static_primitive(shape: &StaticShape) -> Option<PrimitiveBlueprint> {
    match shape {
        StaticShape::Plane { a, b, c, d } => {
            let (normal, norm) = UnitVector::try_new_and_get(Vector::new(*a, *b, *c), 0.0)?;
            let frame = Isometry::new(normal.into_inner() * (*d / norm), Vector::zeros());
            PrimitiveBlueprint::new(PrimitiveGeometry::HalfSpace { normal }, frame)
        }
    }
}

/// Pads a mesh by moving each vertex away from the mesh centroid.
///
/// The displacement is applied to each coordinate independently: a
/// coordinate strictly greater than the centroid's grows by `padding`, any
/// other coordinate shrinks by `padding`. This is not a true offset surface.
// NOTE: corner vertices move by up to `sqrt(3) * padding`, the faces by `padding`.
pub fn pad_mesh_vertices(mesh: &Mesh, padding: Real) -> Vec<Point<Real>> {
    let center = mesh.centroid();
    let pad = |delta: Real| {
        if delta > 0.0 {
            delta + padding
        } else {
            delta - padding
        }
    };

    mesh.vertices
        .iter()
        .map(|pt| {
            let delta = pt - center;
            center + Vector::new(pad(delta.x), pad(delta.y), pad(delta.z))
        })
        .collect()
}
