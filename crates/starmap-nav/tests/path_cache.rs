use starmap_nav::{LocationId, PathCache, PathKey, PathResult};

#[test]
fn cache_is_write_once() {
    let key = PathKey::new(LocationId(1), LocationId(2));
    let first = PathResult {
        total_jumps: 1,
        systems: vec![LocationId(1), LocationId(2)],
    };
    let second = PathResult::unreachable(LocationId(1));

    let mut cache = PathCache::new();
    assert!(cache.put(key, first.clone()));
    assert!(!cache.put(key, second));

    assert_eq!(cache.get(&key), Some(&first));
    assert_eq!(cache.len(), 1);
}

#[test]
fn keys_do_not_collide_past_ten_thousand() {
    // The old `origin * 10000 + destination` scheme maps both of these to 10_000.
    let a = PathKey::new(LocationId(1), LocationId(0));
    let b = PathKey::new(LocationId(0), LocationId(10_000));
    assert_ne!(a, b);
    assert_ne!(a.packed(), b.packed());

    let mut cache = PathCache::new();
    assert!(cache.put(a, PathResult::unreachable(LocationId(1))));
    assert!(cache.put(b, PathResult::unreachable(LocationId(0))));
    assert_eq!(cache.len(), 2);
}

#[test]
fn key_direction_matters() {
    let forward = PathKey::new(LocationId(3), LocationId(4));
    let reverse = PathKey::new(LocationId(4), LocationId(3));

    let mut cache = PathCache::new();
    cache.put(forward, PathResult::unreachable(LocationId(3)));

    assert!(cache.contains_key(&forward));
    assert!(!cache.contains_key(&reverse));
}
