use crate::line::{AccessKind, CacheLine, LineStore};

#[test]
fn new_line_is_clean_and_unused() {
    let line = CacheLine::new(8, 0x100);
    assert_eq!(line.address(), 0x100);
    assert!(!line.is_dirty());
    assert_eq!(line.accessed_bytes(), &[false; 8]);
    assert_eq!(line.utilization(), 0);
}

#[test]
fn read_marks_bytes_relative_to_the_base() {
    let mut line = CacheLine::new(8, 0x100);
    line.read(0x102, 3);
    assert_eq!(line.accessed_bytes(), &[false, false, true, true, true, false, false, false]);
    assert!(!line.is_dirty());
}

#[test]
fn overlapping_accesses_count_once() {
    let mut line = CacheLine::new(8, 0);
    line.read(0, 4);
    line.read(2, 4);
    line.access(3, 1, AccessKind::Read);
    assert_eq!(line.utilization(), 6);
}

#[test]
fn write_is_sticky() {
    let mut line = CacheLine::new(4, 0);
    line.write(0, 1);
    line.read(1, 1);
    assert!(line.is_dirty());
    assert_eq!(line.utilization(), 2);
}

#[test]
fn whole_line_access() {
    let mut line = CacheLine::new(4, 4);
    line.write(4, 4);
    assert_eq!(line.utilization(), 4);
}

#[test]
#[should_panic]
fn access_past_the_end_panics() {
    let mut line = CacheLine::new(4, 0);
    line.read(2, 4);
}

#[test]
#[should_panic]
fn access_before_the_base_panics() {
    let mut line = CacheLine::new(4, 8);
    line.read(7, 1);
}

#[test]
fn display_shows_address_and_bitmap() {
    let mut line = CacheLine::new(4, 0xFF0);
    line.read(0xFF1, 2);
    assert_eq!(line.to_string(), "Address: ff0, Utilization: 0110");
}

#[test]
fn store_reuses_released_slots() {
    let mut store = LineStore::new();
    let a = store.allocate(4, 0);
    let b = store.allocate(4, 4);
    assert_eq!(store.len(), 2);
    let released = store.release(a);
    assert_eq!(released.address(), 0);
    assert_eq!(store.len(), 1);
    assert!(store.get(a).is_none());
    let c = store.allocate(4, 8);
    assert_eq!(c, a);
    assert_eq!(store[c].address(), 8);
    assert_eq!(store[b].address(), 4);
    store[b].write(5, 1);
    assert!(store[b].is_dirty());
}

#[test]
#[should_panic]
fn double_release_panics() {
    let mut store = LineStore::new();
    let a = store.allocate(4, 0);
    let _ = store.release(a);
    let _ = store.release(a);
}
