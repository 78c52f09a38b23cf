use crate::cache::Cache;
use crate::line::{AccessKind, LineStore};

#[test]
fn probes_do_not_create_sets() {
    let mut cache = Cache::new(64, 2, 4);
    let mut lines = LineStore::new();
    assert!(!cache.contains(0));
    assert_eq!(cache.lookup(0), None);
    assert_eq!(cache.evict_lru(0), None);
    assert_eq!(cache.remove_line(0), None);
    assert_eq!(cache.access_line(0, 1, AccessKind::Read, &mut lines), None);
    assert_eq!(cache.initialised_set_count(), 0);
}

#[test]
fn insert_creates_the_set_lazily() {
    let mut cache = Cache::new(64, 2, 4);
    let mut lines = LineStore::new();
    let line = lines.allocate(4, 8);
    assert!(cache.insert(8, line));
    assert_eq!(cache.initialised_set_count(), 1);
    assert!(cache.contains(8));
    // Any address within the line finds it
    assert!(cache.contains(11));
    assert_eq!(cache.lookup(10), Some(line));
}

#[test]
fn access_line_forwards_to_the_line() {
    let mut cache = Cache::new(64, 2, 4);
    let mut lines = LineStore::new();
    let line = lines.allocate(4, 8);
    assert!(cache.insert(8, line));
    assert_eq!(cache.access_line(9, 2, AccessKind::Write, &mut lines), Some(line));
    assert!(lines[line].is_dirty());
    assert_eq!(lines[line].accessed_bytes(), &[false, true, true, false]);
}

#[test]
fn addresses_in_different_sets_do_not_compete() {
    // 2 sets, direct mapped, 1 byte lines
    let mut cache = Cache::new(2, 1, 1);
    let mut lines = LineStore::new();
    let a = lines.allocate(1, 0);
    let b = lines.allocate(1, 1);
    let c = lines.allocate(1, 2);
    assert!(cache.insert(0, a));
    assert!(cache.insert(1, b));
    // Address 2 maps to set 0, which is full
    assert!(!cache.insert(2, c));
    assert_eq!(cache.evict_lru(2), Some(a));
    assert!(cache.insert(2, c));
    assert!(cache.contains(1));
    assert!(!cache.contains(0));
    assert_eq!(cache.resident_lines().count(), 2);
}

#[test]
fn remove_line_ignores_recency() {
    let mut cache = Cache::new(8, 2, 4);
    let mut lines = LineStore::new();
    let a = lines.allocate(4, 0);
    let b = lines.allocate(4, 4);
    assert!(cache.insert(0, a));
    assert!(cache.insert(4, b));
    assert_eq!(cache.remove_line(4), Some(b));
    assert_eq!(cache.evict_lru(0), None);
    assert_eq!(cache.resident_lines().collect::<Vec<_>>(), vec![a]);
}
