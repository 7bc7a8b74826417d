//! Correctness Tests for FixedSizeMap
//!
//! These tests pin down which entry gets evicted for small, deterministic
//! access patterns, plus the capacity and overwrite rules.
//!
//! ## Test Strategy
//! - Capacities of 1-3 so every eviction is predictable
//! - Each eviction test checks every key afterwards
//! - Longer mixed sequences check the capacity bound and internal invariants

use fixed_size_map::config::FixedSizeMapConfig;
use fixed_size_map::{Error, FixedSizeMap};

/// Helper to create a string map with the given capacity
fn make_map(cap: usize) -> FixedSizeMap<&'static str, &'static str> {
    FixedSizeMap::new(cap).unwrap()
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_max_size_must_be_greater_than_zero() {
    let err = FixedSizeMap::<String, String>::new(0).unwrap_err();
    assert_eq!(err, Error::InvalidCapacity { capacity: 0 });
    assert!(err.to_string().contains("max size must be greater than 0"));
}

#[test]
fn test_any_positive_capacity_is_accepted() {
    let mut map: FixedSizeMap<u64, u64> = FixedSizeMap::new(usize::MAX).unwrap();
    assert_eq!(map.cap().get(), usize::MAX);

    map.put(1, 100);
    assert_eq!(map.get(&1), Some(&100));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_init_from_config() {
    let map: FixedSizeMap<String, i32> =
        FixedSizeMap::init(FixedSizeMapConfig { capacity: 5 }, None).unwrap();
    assert_eq!(map.cap().get(), 5);
    assert!(map.is_empty());

    let err = FixedSizeMap::<String, i32>::init(FixedSizeMapConfig { capacity: 0 }, None);
    assert!(matches!(err, Err(Error::InvalidCapacity { capacity: 0 })));
}

#[test]
fn test_with_std_hasher() {
    let mut map: FixedSizeMap<&str, i32, std::collections::hash_map::RandomState> =
        FixedSizeMap::with_hasher(2, std::collections::hash_map::RandomState::new()).unwrap();
    map.put("a", 1);
    assert_eq!(map.get(&"a"), Some(&1));
}

// ============================================================================
// BASIC ASSOCIATION
// ============================================================================

#[test]
fn test_associations_can_be_added_and_retrieved() {
    let mut map = make_map(1);
    map.put("aKey", "aValue");
    assert_eq!(map.get(&"aKey"), Some(&"aValue"));
}

#[test]
fn test_put_returns_none_for_new_key() {
    let mut map = make_map(1);
    assert_eq!(map.put("aKey", "aValue"), None);
}

#[test]
fn test_put_returns_previous_value() {
    let mut map = make_map(1);
    map.put("aKey", "aValue");
    assert_eq!(map.put("aKey", "anotherValue"), Some("aValue"));
    assert_eq!(map.get(&"aKey"), Some(&"anotherValue"));
}

#[test]
fn test_get_returns_none_for_unknown_key() {
    let mut map = make_map(1);
    assert_eq!(map.get(&"nonExistentKey"), None);
    assert!(map.is_empty());
}

// ============================================================================
// EVICTION
// ============================================================================
// The victim is the oldest key in the bucket under the minimum-frequency
// cursor, which `put` always resets to 0.

#[test]
fn test_second_key_evicts_first_with_capacity_one() {
    let mut map = make_map(1);
    map.put("aKey", "aValue");
    map.put("anotherKey", "anotherValue");

    assert_eq!(map.get(&"aKey"), None);
    assert_eq!(map.get(&"anotherKey"), Some(&"anotherValue"));
}

#[test]
fn test_least_accessed_entry_is_evicted() {
    let mut map = make_map(3);
    map.put("aKey", "aValue");
    map.put("bKey", "bValue");
    map.put("cKey", "cValue");
    map.get(&"aKey");
    map.get(&"bKey");

    map.put("dKey", "dValue");

    assert_eq!(map.get(&"aKey"), Some(&"aValue"));
    assert_eq!(map.get(&"bKey"), Some(&"bValue"));
    assert_eq!(map.get(&"cKey"), None);
    assert_eq!(map.get(&"dKey"), Some(&"dValue"));
}

#[test]
fn test_oldest_entry_evicted_on_access_count_tie() {
    let mut map = make_map(3);
    map.put("aKey", "aValue");
    map.put("bKey", "bValue");
    map.put("cKey", "cValue");
    map.get(&"bKey");

    map.put("dKey", "dValue");

    assert_eq!(map.get(&"aKey"), None);
    assert_eq!(map.get(&"bKey"), Some(&"bValue"));
    assert_eq!(map.get(&"cKey"), Some(&"cValue"));
    assert_eq!(map.get(&"dKey"), Some(&"dValue"));
}

#[test]
fn test_overwrite_resets_access_count() {
    let mut map = make_map(2);
    map.put("aKey", "aValue");
    map.put("bKey", "bValue");
    map.get(&"aKey");
    map.get(&"bKey");

    map.put("bKey", "anotherBValue");
    map.put("cKey", "cValue");

    // bKey was the only entry back at count 0
    assert_eq!(map.get(&"aKey"), Some(&"aValue"));
    assert_eq!(map.get(&"bKey"), None);
    assert_eq!(map.get(&"cKey"), Some(&"cValue"));
}

#[test]
fn test_overwrite_does_not_evict_when_full() {
    let mut map = make_map(2);
    map.put("a", "1");
    map.put("b", "2");

    assert_eq!(map.put("a", "3"), Some("1"));
    assert_eq!(map.len(), 2);
    assert_eq!(map.peek(&"b"), Some(&"2"));
    assert_eq!(map.stats().core.evictions, 0);
}

#[test]
fn test_overwritten_key_is_newest_in_zero_bucket() {
    let mut map = make_map(3);
    map.put("a", "1");
    map.put("b", "2");
    map.put("c", "3");

    // a moves behind b and c
    map.put("a", "4");
    map.put("d", "5");

    assert!(!map.contains_key(&"b"));
    assert_eq!(map.peek(&"a"), Some(&"4"));
    assert_eq!(map.peek(&"c"), Some(&"3"));
    assert_eq!(map.peek(&"d"), Some(&"5"));
}

#[test]
fn test_frequently_read_entry_survives_churn() {
    let mut map = FixedSizeMap::new(3).unwrap();
    map.put(0, 0);
    for _ in 0..5 {
        map.get(&0);
    }

    for i in 1..100 {
        map.put(i, i);
        assert!(map.contains_key(&0), "hot key evicted at step {i}");
    }
    assert_eq!(map.access_count(&0), Some(5));
}

// ============================================================================
// MINIMUM-FREQUENCY CURSOR
// ============================================================================

#[test]
#[should_panic(expected = "nothing to evict")]
fn test_full_map_with_empty_zero_bucket_panics() {
    let mut map = make_map(2);
    map.put("a", "1");
    map.put("b", "2");
    map.get(&"a");
    map.get(&"b");

    map.put("c", "3");
}

#[test]
fn test_cursor_stays_at_zero_after_gets() {
    let mut map = make_map(2);
    map.put("a", "1");
    map.get(&"a");
    map.get(&"a");
    assert_eq!(map.min_frequency(), 0);

    // room left, so no eviction is needed
    map.put("b", "2");
    assert_eq!(map.len(), 2);
    assert_eq!(map.min_frequency(), 0);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_repeated_gets_increment_once_per_call() {
    let mut map = make_map(2);
    map.put("a", "value");

    for expected in 1..=10 {
        assert_eq!(map.get(&"a"), Some(&"value"));
        assert_eq!(map.access_count(&"a"), Some(expected));
    }
    assert_eq!(map.peek(&"a"), Some(&"value"));
}

#[test]
fn test_size_never_exceeds_capacity() {
    let mut map = FixedSizeMap::new(8).unwrap();

    // pseudo-random walk that always leaves a fresh key in bucket 0 before
    // adding another new key
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    for step in 0..2_000u64 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let key = state % 32;

        if step % 3 == 0 {
            map.get(&key);
        }
        map.put(key, step);

        assert!(map.len() <= map.cap().get());
        map.check_invariants().unwrap();
    }
}

#[test]
fn test_metrics_follow_operations() {
    let mut map = make_map(1);
    map.put("a", "1");
    map.put("a", "2");
    map.put("b", "3");
    map.get(&"b");
    map.get(&"a");

    let stats = map.stats();
    assert_eq!(stats.core.insertions, 2);
    assert_eq!(stats.core.overwrites, 1);
    assert_eq!(stats.core.evictions, 1);
    assert_eq!(stats.core.cache_hits, 1);
    assert_eq!(stats.core.requests, 2);
    assert_eq!(stats.promotions, 1);
}
