/// Errors raised while configuring a [`CollisionEnvironment`](super::CollisionEnvironment).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// The collision backend cannot represent a shape (e.g. an empty mesh).
    #[error("the shape of '{owner}' cannot be turned into a collision primitive")]
    UnsupportedShape {
        /// The link, attached body or namespace the shape belongs to.
        owner: String,
    },
    /// A batch of world objects was given a different number of shapes and poses.
    #[error("{shapes} shapes were given with {poses} poses")]
    ShapePoseCountMismatch {
        /// The number of shapes.
        shapes: usize,
        /// The number of poses.
        poses: usize,
    },
    /// An allowed-collision matrix is not square.
    #[error("row {row} of the collision matrix has {len} entries instead of {expected}")]
    MalformedCollisionMatrix {
        /// The faulty row.
        row: usize,
        /// Its length.
        len: usize,
        /// The number of rows of the matrix.
        expected: usize,
    },
    /// An allowed-collision matrix maps a name to a non-existent row.
    #[error("'{name}' is mapped to index {index} of a collision matrix of size {size}")]
    CollisionMatrixIndexOutOfRange {
        /// The entity name.
        name: String,
        /// Its index.
        index: usize,
        /// The size of the matrix.
        size: usize,
    },
    /// No collision link with this name is part of the robot geometry.
    #[error("unknown collision link '{0}'")]
    UnknownLink(String),
}
