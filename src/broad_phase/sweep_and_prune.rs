use crate::geometry::PrimitiveHandle;
use crate::math::Aabb;
use crate::parry::bounding_volume::BoundingVolume;
use ordered_float::OrderedFloat;

use super::IndexEntry;

/// Reports every pair of `entries` whose bounding boxes intersect.
///
/// The entries are sorted by the lower bound of their AABB along `x`, then
/// each entry is only compared to the ones that start before it ends. `f`
/// returns `false` to stop the sweep early.
pub fn sweep_and_prune(
    entries: &mut [IndexEntry],
    mut f: impl FnMut(PrimitiveHandle, PrimitiveHandle) -> bool,
) {
    entries.sort_by_key(|e| OrderedFloat(e.aabb.mins.x));

    for (i, a) in entries.iter().enumerate() {
        for b in &entries[i + 1..] {
            if b.aabb.mins.x > a.aabb.maxs.x {
                break;
            }

            if a.aabb.intersects(&b.aabb) && !f(a.handle, b.handle) {
                return;
            }
        }
    }
}

/// All the overlapping pairs of `aabbs`, as pairs of handles.
pub fn overlapping_pairs(
    aabbs: impl IntoIterator<Item = (PrimitiveHandle, Aabb)>,
) -> Vec<(PrimitiveHandle, PrimitiveHandle)> {
    let mut entries: Vec<_> = aabbs
        .into_iter()
        .map(|(handle, aabb)| IndexEntry { handle, aabb })
        .collect();
    let mut pairs = vec![];
    sweep_and_prune(&mut entries, |a, b| {
        pairs.push((a, b));
        true
    });
    pairs
}
