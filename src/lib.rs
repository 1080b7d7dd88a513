/*!
collision-space3d
========

**collision-space3d** checks an articulated robot against itself and against
named collections of obstacles. It is built on top of
[parry](https://parry.rs) (the `f64` 3D build) for the exact geometric
queries and adds the bookkeeping a motion planner needs around them:
per-link padding, attached bodies, allowed-touch permissions, namespaced
world objects and a sorted-axes broad-phase.

The entry point is [`environment::CollisionEnvironment`].

# Threading

An environment is not internally synchronized. Mutating operations take
`&mut self`, queries take `&self`, so the borrow checker already forbids
mutating an instance while it is being queried. To run queries from several
threads, give each worker its own clone.
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;
pub extern crate parry3d_f64 as parry;

pub mod backend;
pub mod broad_phase;
pub mod environment;
pub mod geometry;
pub mod kinematics;
pub mod permissions;
pub mod robot;
pub mod shapes;
pub mod world;

pub use crate::environment::{
    AllowedContact, CollisionEnvironment, Contact, ContactReport, EnvironmentError,
};

/// Aliases for the mathematical types used throughout this crate.
pub mod math {
    pub use crate::parry::bounding_volume::Aabb;
    pub use crate::parry::math::{Isometry, Point, Real, Translation, UnitVector, Vector, DIM};
}
