use bamfeat_rs::{merge_regions, Region};

fn r(start: i32, end: i32) -> Region {
    Region::new(start, end).expect("valid region")
}

#[test]
fn construction_rejects_inverted_bounds() {
    assert!(Region::new(10, 5).is_none());
    assert!(Region::new(5, 5).is_some());
}

#[test]
fn regions_are_value_types() {
    assert_eq!(r(1, 10), r(1, 10));
    let mut set = std::collections::HashSet::new();
    set.insert(r(1, 10));
    set.insert(r(1, 10));
    assert_eq!(set.len(), 1);
}

#[test]
fn intersection_arithmetic() {
    assert!(r(1, 10).intersects(r(10, 20)));
    assert!(!r(1, 10).intersects(r(11, 20)));
    assert_eq!(r(1, 10).intersection(r(5, 20)), Some(r(5, 10)));
    assert_eq!(r(1, 10).intersection(r(11, 20)), None);
}

#[test]
fn merge_fuses_abutting_regions() {
    assert_eq!(merge_regions(vec![r(1, 10), r(11, 20)]), vec![r(1, 20)]);
}

#[test]
fn merge_keeps_gapped_regions_apart() {
    assert_eq!(
        merge_regions(vec![r(1, 10), r(12, 20)]),
        vec![r(1, 10), r(12, 20)]
    );
}

#[test]
fn merge_collapses_overlaps_and_duplicates() {
    assert_eq!(
        merge_regions(vec![r(1, 10), r(5, 15), r(1, 10), r(30, 40)]),
        vec![r(1, 15), r(30, 40)]
    );
    // A region swallowed by a wider one must not reset the running end.
    assert_eq!(
        merge_regions(vec![r(1, 100), r(20, 30), r(90, 110)]),
        vec![r(1, 110)]
    );
}

#[test]
fn merge_is_order_independent() {
    let forward = merge_regions(vec![r(1, 10), r(8, 20), r(25, 30)]);
    let backward = merge_regions(vec![r(25, 30), r(8, 20), r(1, 10)]);
    assert_eq!(forward, backward);
}

#[test]
fn merge_is_idempotent() {
    let once = merge_regions(vec![r(3, 7), r(1, 4), r(9, 12), r(13, 13)]);
    let twice = merge_regions(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn merge_of_empty_input_is_empty() {
    assert!(merge_regions(Vec::new()).is_empty());
}
