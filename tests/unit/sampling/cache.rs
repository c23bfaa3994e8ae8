use super::*;

fn result(errored: bool) -> SamplingResult {
    SamplingResult::ready(Vec::new(), errored)
}

#[test]
fn never_exceeds_capacity_and_evicts_oldest() {
    let mut cache = SampleCache::default();
    for i in 0..DEFAULT_CACHE_CAPACITY {
        cache.insert(format!("k{i}"), result(false));
    }
    assert_eq!(cache.len(), 40);

    cache.insert("k40".to_string(), result(false));
    assert_eq!(cache.len(), 40);
    assert!(cache.lookup("k0").is_none());
    assert!(cache.lookup("k1").is_some());
    assert!(cache.lookup("k40").is_some());
}

#[test]
fn lookup_does_not_refresh_position() {
    let mut cache = SampleCache::new(2);
    cache.insert("a".to_string(), result(false));
    cache.insert("b".to_string(), result(false));
    assert!(cache.lookup("a").is_some());

    cache.insert("c".to_string(), result(false));
    assert!(cache.lookup("a").is_none());
    assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["b", "c"]);
}

#[test]
fn reinsert_moves_key_to_newest() {
    let mut cache = SampleCache::new(2);
    cache.insert("a".to_string(), result(false));
    cache.insert("b".to_string(), result(false));
    cache.insert("a".to_string(), result(true));
    assert_eq!(cache.len(), 2);

    cache.insert("c".to_string(), result(false));
    assert!(cache.lookup("b").is_none());
    assert_eq!(cache.lookup("a").map(|r| r.errored), Some(true));
    assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["a", "c"]);
}

#[test]
fn zero_capacity_still_holds_one_entry() {
    let mut cache = SampleCache::new(0);
    cache.insert("a".to_string(), result(false));
    cache.insert("b".to_string(), result(false));
    assert_eq!(cache.capacity(), 1);
    assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["b"]);

    cache.clear();
    assert!(cache.is_empty());
}
