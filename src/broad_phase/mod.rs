//! Broad-phase structures pruning the pairs handed to the narrow-phase.
//!
//! World obstacles live in a [`SortedAxesIndex`], queried once per robot
//! primitive. The robot primitives are checked against each other with a
//! single [`sweep_and_prune`] pass, since they move at every query.

pub use self::sorted_axes::{IndexEntry, SortedAxesIndex, AXIS_CANDIDATES_CUTOFF};
pub use self::sweep_and_prune::{overlapping_pairs, sweep_and_prune};

mod sorted_axes;
mod sweep_and_prune;
