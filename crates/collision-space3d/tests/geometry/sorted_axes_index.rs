use collision_space3d::broad_phase::SortedAxesIndex;
use collision_space3d::geometry::PrimitiveHandle;
use collision_space3d::math::{Aabb, Point, Real, Vector};
use collision_space3d::parry::bounding_volume::BoundingVolume;

fn spaced_boxes(n: u32, spacing: Real) -> (SortedAxesIndex, Vec<(PrimitiveHandle, Aabb)>) {
    let mut index = SortedAxesIndex::new();
    let mut all = vec![];
    for i in 0..n {
        let handle = PrimitiveHandle::from_raw(i);
        let center = Point::new(i as Real * spacing, (i % 7) as Real, (i % 3) as Real);
        let aabb = Aabb::from_half_extents(center, Vector::repeat(0.5));
        index.register(handle, aabb);
        all.push((handle, aabb));
    }
    index.setup();
    (index, all)
}

#[test]
fn index_matches_brute_force_on_random_worlds() {
    let mut rng = oorandom::Rand64::new(1234);
    let mut index = SortedAxesIndex::new();
    let mut all = vec![];

    for i in 0..2000u32 {
        let center = Point::new(
            rng.rand_float() * 50.0,
            rng.rand_float() * 50.0,
            rng.rand_float() * 5.0,
        );
        // A few large entries among many small ones.
        let half = if i % 97 == 0 { 10.0 } else { 0.5 };
        let aabb = Aabb::from_half_extents(center, Vector::repeat(half * rng.rand_float() + 0.01));
        index.register(PrimitiveHandle::from_raw(i), aabb);
        all.push((PrimitiveHandle::from_raw(i), aabb));
    }
    index.setup();

    for _ in 0..300 {
        let probe = Aabb::from_half_extents(
            Point::new(
                rng.rand_float() * 50.0,
                rng.rand_float() * 50.0,
                rng.rand_float() * 5.0,
            ),
            Vector::repeat(rng.rand_float() * 2.0),
        );

        let mut expected: Vec<_> = all
            .iter()
            .filter(|(_, aabb)| aabb.intersects(&probe))
            .map(|(h, _)| *h)
            .collect();
        let mut found = index.candidates(&probe);
        expected.sort();
        found.sort();
        assert_eq!(found, expected);
    }
}

#[test]
fn probe_between_spaced_boxes_finds_exactly_one() {
    let (index, all) = spaced_boxes(200, 2.0);

    for (handle, aabb) in all.iter().step_by(13) {
        let probe = Aabb::from_half_extents(aabb.center(), Vector::repeat(0.7));
        assert_eq!(index.candidates(&probe), vec![*handle]);
    }
}

#[test]
fn removed_primitive_is_never_returned() {
    let (mut index, all) = spaced_boxes(50, 2.0);
    let (removed, aabb) = all[20];

    index.unregister(removed, &aabb);
    assert_eq!(index.len(), 49);
    assert!(index.candidates(&aabb).is_empty());
    assert!(index.handles().all(|h| h != removed));

    let everything = Aabb::new(Point::new(-10.0, -10.0, -10.0), Point::new(200.0, 10.0, 10.0));
    assert!(!index.candidates(&everything).contains(&removed));
    assert_eq!(index.candidates(&everything).len(), 49);
}

#[test]
#[should_panic]
fn removing_an_unregistered_primitive_panics() {
    let (mut index, all) = spaced_boxes(10, 2.0);
    let (_, aabb) = all[3];
    index.unregister(PrimitiveHandle::from_raw(1000), &aabb);
}
