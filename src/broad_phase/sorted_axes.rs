use crate::geometry::PrimitiveHandle;
use crate::math::{Aabb, Real, Vector, DIM};
use crate::parry::bounding_volume::BoundingVolume;
use ordered_float::OrderedFloat;
use std::ops::Range;

/// Above this number of candidates along one axis, the next axis is tried.
///
/// Two binary searches on a sorted array take about `log(n)` steps (a dozen
/// for typical worlds), each costing only a few operations.
pub const AXIS_CANDIDATES_CUTOFF: usize = 100;

/// A primitive registered into a [`SortedAxesIndex`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IndexEntry {
    /// The registered primitive.
    pub handle: PrimitiveHandle,
    /// Its bounding box at registration time.
    pub aabb: Aabb,
}

/// A broad-phase over static primitives, made of three arrays of the same
/// entries sorted by the lower bound of their AABB along `x`, `y` and `z`.
///
/// A query binary-searches the sorted arrays for the entries that may
/// overlap the query AABB along one axis, trying the next axis only when the
/// first one is not discriminating enough. The resulting candidates are
/// filtered by a full AABB test, so the index never misses a pair that a
/// brute-force AABB test would report.
///
/// Registered AABBs are never updated: primitives must not move while they
/// are part of the index.
#[derive(Clone, Debug, Default)]
pub struct SortedAxesIndex {
    sorted: [Vec<IndexEntry>; DIM],
    // Largest extent of a registered AABB along each axis. An entry starting
    // before `query.mins - max_extents` cannot reach the query.
    max_extents: Vector<Real>,
    dirty: bool,
}

impl SortedAxesIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of registered primitives.
    pub fn len(&self) -> usize {
        self.sorted[0].len()
    }

    /// Returns `true` if no primitive is registered.
    pub fn is_empty(&self) -> bool {
        self.sorted[0].is_empty()
    }

    /// Returns `true` if the index is ready to answer queries.
    pub fn is_set_up(&self) -> bool {
        !self.dirty
    }

    /// Registers a primitive with the given bounding box.
    ///
    /// The index must be [set up](Self::setup) again before the next query.
    pub fn register(&mut self, handle: PrimitiveHandle, aabb: Aabb) {
        let entry = IndexEntry { handle, aabb };
        for sorted in &mut self.sorted {
            sorted.push(entry);
        }
        self.max_extents = self.max_extents.sup(&aabb.extents());
        self.dirty = true;
    }

    /// Sorts the entries if any were registered since the last call.
    pub fn setup(&mut self) {
        if self.dirty {
            for (axis, sorted) in self.sorted.iter_mut().enumerate() {
                sorted.sort_by_key(|entry| OrderedFloat(entry.aabb.mins[axis]));
            }
            self.update_max_extents();
            self.dirty = false;
        }
    }

    fn update_max_extents(&mut self) {
        self.max_extents = self.sorted[0]
            .iter()
            .fold(Vector::zeros(), |extents, entry| extents.sup(&entry.aabb.extents()));
    }

    /// Removes a primitive registered with the bounding box `aabb`.
    ///
    /// # Panics
    /// Panics if the primitive is not registered with exactly this bounding box.
    pub fn unregister(&mut self, handle: PrimitiveHandle, aabb: &Aabb) {
        self.setup();

        let mut found = [false; DIM];
        for (axis, sorted) in self.sorted.iter_mut().enumerate() {
            let low = aabb.mins[axis];
            let start = sorted.partition_point(|e| e.aabb.mins[axis] < low);
            let end = start + sorted[start..].partition_point(|e| e.aabb.mins[axis] <= low);

            if let Some(i) = sorted[start..end].iter().position(|e| e.handle == handle) {
                let _ = sorted.remove(start + i);
                found[axis] = true;
            }
        }

        assert!(
            found.iter().all(|f| *f),
            "Primitive {:?} is not registered in this index (found along axes: {:?}).",
            handle,
            found
        );
        self.update_max_extents();
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        for sorted in &mut self.sorted {
            sorted.clear();
        }
        self.max_extents = Vector::zeros();
        self.dirty = false;
    }

    /// All the registered entries, in no particular order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.sorted[0]
    }

    /// All the registered primitives, in no particular order.
    pub fn handles(&self) -> impl Iterator<Item = PrimitiveHandle> + '_ {
        self.sorted[0].iter().map(|e| e.handle)
    }

    fn axis_range(&self, axis: usize, aabb: &Aabb) -> Range<usize> {
        let sorted = &self.sorted[axis];
        let reach = aabb.mins[axis] - self.max_extents[axis];
        let start = sorted.partition_point(|e| e.aabb.mins[axis] < reach);
        let end = start + sorted[start..].partition_point(|e| e.aabb.mins[axis] <= aabb.maxs[axis]);
        start..end
    }

    /// Calls `f` on every registered primitive whose bounding box intersects `aabb`.
    ///
    /// `f` returns `false` to stop the traversal early.
    ///
    /// # Panics
    /// Panics if primitives were registered since the last call to [`Self::setup`].
    pub fn for_each_candidate(&self, aabb: &Aabb, mut f: impl FnMut(&IndexEntry) -> bool) {
        assert!(
            !self.dirty,
            "The sorted-axes index must be set up before being queried."
        );

        let (axis, range) = self.best_axis_range(aabb);
        for entry in &self.sorted[axis][range] {
            if entry.aabb.intersects(aabb) && !f(entry) {
                return;
            }
        }
    }

    /// The primitives whose bounding boxes intersect `aabb`.
    pub fn candidates(&self, aabb: &Aabb) -> Vec<PrimitiveHandle> {
        let mut result = vec![];
        self.for_each_candidate(aabb, |entry| {
            result.push(entry.handle);
            true
        });
        result
    }

    /// Selects the axis to scan for `aabb`, together with the range of
    /// entries to be tested along it.
    fn best_axis_range(&self, aabb: &Aabb) -> (usize, Range<usize>) {
        let mut best = (0, self.axis_range(0, aabb));

        for axis in 1..DIM {
            if best.1.len() <= AXIS_CANDIDATES_CUTOFF {
                break;
            }

            let range = self.axis_range(axis, aabb);
            if range.len() < best.1.len() {
                best = (axis, range);
            }
        }

        best
    }
}
