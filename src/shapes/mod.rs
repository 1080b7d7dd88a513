//! Descriptions of the collision geometry attached to links, bodies and obstacles.
//!
//! These are plain values: they say *what* a surface looks like, not where it
//! is. They are turned into backend primitives by
//! [`geometry::build_primitive`](crate::geometry::build_primitive).

use crate::math::{Point, Real, Vector};

/// The kind of a [`Shape`] or [`StaticShape`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ShapeKind {
    /// A sphere.
    Sphere,
    /// A box.
    Box,
    /// A cylinder.
    Cylinder,
    /// A triangle mesh.
    Mesh,
    /// An infinite plane.
    Plane,
}

/// A triangle mesh given by its vertices and its triangles.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Mesh {
    /// The vertex buffer.
    pub vertices: Vec<Point<Real>>,
    /// Indices into `vertices`, three per triangle.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates a new mesh from a vertex buffer and an index buffer.
    pub fn new(vertices: Vec<Point<Real>>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    /// Returns `true` if this mesh has no vertex or no triangle.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.triangles.is_empty()
    }

    /// The average of all the vertices of this mesh.
    ///
    /// Returns the origin if the mesh has no vertex.
    pub fn centroid(&self) -> Point<Real> {
        if self.vertices.is_empty() {
            return Point::origin();
        }

        let sum = self
            .vertices
            .iter()
            .fold(Vector::zeros(), |acc, pt| acc + pt.coords);
        Point::from(sum / self.vertices.len() as Real)
    }
}

/// A shape that can be placed anywhere by a pose.
///
/// Sizes are expressed in the shape's local frame, which is centered on the
/// shape. Cylinders are aligned with the local `z` axis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Shape {
    /// A sphere with the given radius.
    Sphere {
        /// The sphere radius.
        radius: Real,
    },
    /// A box with the given full edge lengths.
    Box {
        /// The edge lengths along `x`, `y` and `z`.
        size: Vector<Real>,
    },
    /// A cylinder aligned with the local `z` axis.
    Cylinder {
        /// The cylinder radius.
        radius: Real,
        /// The full length of the cylinder along `z`.
        length: Real,
    },
    /// A triangle mesh.
    Mesh(Mesh),
}

impl Shape {
    /// A sphere with the given radius.
    pub fn sphere(radius: Real) -> Self {
        Shape::Sphere { radius }
    }

    /// A box with the given full edge lengths.
    pub fn cuboid(x: Real, y: Real, z: Real) -> Self {
        Shape::Box {
            size: Vector::new(x, y, z),
        }
    }

    /// A cylinder aligned with the local `z` axis.
    pub fn cylinder(radius: Real, length: Real) -> Self {
        Shape::Cylinder { radius, length }
    }

    /// A triangle mesh.
    pub fn mesh(vertices: Vec<Point<Real>>, triangles: Vec<[u32; 3]>) -> Self {
        Shape::Mesh(Mesh::new(vertices, triangles))
    }

    /// The kind of this shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Sphere { .. } => ShapeKind::Sphere,
            Shape::Box { .. } => ShapeKind::Box,
            Shape::Cylinder { .. } => ShapeKind::Cylinder,
            Shape::Mesh(_) => ShapeKind::Mesh,
        }
    }
}

/// A shape that cannot be moved once created.
///
/// Static shapes are only meant for world obstacles such as the ground.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum StaticShape {
    /// The solid half-space `a * x + b * y + c * z <= d`.
    Plane {
        /// `x` coefficient of the plane equation.
        a: Real,
        /// `y` coefficient of the plane equation.
        b: Real,
        /// `z` coefficient of the plane equation.
        c: Real,
        /// Offset of the plane equation.
        d: Real,
    },
}

impl StaticShape {
    /// The solid half-space `a * x + b * y + c * z <= d`.
    pub fn plane(a: Real, b: Real, c: Real, d: Real) -> Self {
        StaticShape::Plane { a, b, c, d }
    }

    /// The kind of this shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            StaticShape::Plane { .. } => ShapeKind::Plane,
        }
    }
}
