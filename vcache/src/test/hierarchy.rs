use crate::error::ConfigError;
use crate::hierarchy::{LineAccess, MultilevelCache};
use crate::line::AccessKind;

fn miss(line: u32) -> LineAccess {
    LineAccess { line, hit_level: None }
}

fn hit(line: u32, level: usize) -> LineAccess {
    LineAccess { line, hit_level: Some(level) }
}

#[test]
fn direct_mapped_single_level() {
    let mut cache = MultilevelCache::new(&[2], &[1], 1).unwrap();
    assert_eq!(cache.read(0, 1), vec![miss(0)]);
    assert_eq!(cache.resident_lines(0), vec![0]);
    assert_eq!(cache.read(1, 1), vec![miss(1)]);
    assert_eq!(cache.resident_lines(0), vec![0, 1]);
    assert_eq!(cache.read(0, 1), vec![hit(0, 0)]);
    assert_eq!((cache.hits(), cache.misses()), (1, 2));
}

#[test]
fn evicted_lines_move_to_the_next_level() {
    let mut cache = MultilevelCache::new(&[1, 2], &[1, 2], 1).unwrap();
    assert_eq!(cache.read(0, 1), vec![miss(0)]);
    assert_eq!(cache.resident_lines(0), vec![0]);
    assert!(cache.resident_lines(1).is_empty());

    assert_eq!(cache.read(1, 1), vec![miss(1)]);
    assert_eq!(cache.resident_lines(0), vec![1]);
    assert_eq!(cache.resident_lines(1), vec![0]);

    assert_eq!(cache.read(2, 1), vec![miss(2)]);
    assert_eq!(cache.resident_lines(0), vec![2]);
    assert_eq!(cache.resident_lines(1), vec![1, 0]);
    assert_eq!(cache.byte_utilizations(), &[0]);
}

#[test]
fn lines_leave_through_the_last_level() {
    let mut cache = MultilevelCache::new(&[1, 2], &[1, 2], 1).unwrap();
    for address in 0..3 {
        let _ = cache.read(address, 1);
    }
    // L2 is full with 1 and 0, so 0 falls out of the hierarchy
    assert_eq!(cache.read(3, 1), vec![miss(3)]);
    assert_eq!(cache.resident_lines(0), vec![3]);
    assert_eq!(cache.resident_lines(1), vec![2, 1]);
    assert_eq!(cache.byte_utilizations(), &[1]);
    assert!(cache.line(0).is_none());
    assert_eq!(cache.resident_line_count(), 3);
}

#[test]
fn outer_level_hit_stays_in_place() {
    let mut cache = MultilevelCache::new(&[1, 2], &[1, 2], 1).unwrap();
    for address in 0..4 {
        let _ = cache.read(address, 1);
    }
    // L1 still gives up 3 to make room, which pushes 2 out of L2
    assert_eq!(cache.read(1, 1), vec![hit(1, 1)]);
    assert!(cache.resident_lines(0).is_empty());
    assert_eq!(cache.resident_lines(1), vec![3, 1]);
    assert_eq!(cache.byte_utilizations(), &[2]);
    assert_eq!((cache.hits(), cache.misses()), (1, 4));
}

#[test]
fn displacement_continues_after_the_line_is_found() {
    // Three levels of one line each
    let mut cache = MultilevelCache::new(&[1, 1, 1], &[1, 1, 1], 1).unwrap();
    for address in 0..3 {
        let _ = cache.read(address, 1);
    }
    assert_eq!(cache.resident_lines(0), vec![2]);
    assert_eq!(cache.resident_lines(1), vec![1]);
    assert_eq!(cache.resident_lines(2), vec![0]);
    // Found in L2, then 2 moves into L2 and pushes 1 on to L3, which pushes 0 out
    assert_eq!(cache.read(1, 1), vec![hit(1, 1)]);
    assert!(cache.resident_lines(0).is_empty());
    assert_eq!(cache.resident_lines(1), vec![2]);
    assert_eq!(cache.resident_lines(2), vec![1]);
    assert_eq!(cache.byte_utilizations(), &[1]);
}

#[test]
fn crossing_accesses_are_split_per_line() {
    let mut cache = MultilevelCache::new(&[64], &[2], 4).unwrap();
    assert_eq!(cache.read(2, 4), vec![miss(0), miss(4)]);
    assert_eq!(cache.read(1, 10), vec![hit(0, 0), hit(4, 0), miss(8)]);
    assert_eq!(cache.hits() + cache.misses(), 5);
    assert_eq!(cache.line(0).unwrap().accessed_bytes(), &[false, true, true, true]);
    assert_eq!(cache.line(4).unwrap().accessed_bytes(), &[true, true, true, true]);
    assert_eq!(cache.line(8).unwrap().accessed_bytes(), &[true, true, true, false]);
}

#[test]
fn aligned_full_line_access_is_one_piece() {
    let mut cache = MultilevelCache::new(&[64], &[2], 4).unwrap();
    assert_eq!(cache.read(8, 4), vec![miss(8)]);
    assert_eq!(cache.read(12, 8), vec![miss(12), miss(16)]);
}

#[test]
fn access_wraps_at_the_top_of_the_address_space() {
    let mut cache = MultilevelCache::new(&[64], &[2], 4).unwrap();
    assert_eq!(cache.read(0xFFFF_FFFE, 4), vec![miss(0xFFFF_FFFC), miss(0)]);
}

#[test]
fn zero_sized_access_does_nothing() {
    let mut cache = MultilevelCache::new(&[64], &[2], 4).unwrap();
    assert!(cache.read(0x40, 0).is_empty());
    assert!(cache.write(0x40, 0).is_empty());
    assert_eq!((cache.hits(), cache.misses()), (0, 0));
    assert_eq!(cache.resident_line_count(), 0);
}

#[test]
fn writes_dirty_the_line() {
    let mut cache = MultilevelCache::new(&[64], &[2], 4).unwrap();
    let _ = cache.read(0, 1);
    assert!(!cache.line(0).unwrap().is_dirty());
    assert_eq!(cache.access(1, 1, AccessKind::Write), vec![hit(0, 0)]);
    assert!(cache.line(0).unwrap().is_dirty());
    let _ = cache.read(2, 1);
    assert!(cache.line(0).unwrap().is_dirty());
}

#[test]
fn utilization_is_recorded_once_per_line() {
    // One line of four bytes
    let mut cache = MultilevelCache::new(&[4], &[1], 4).unwrap();
    let _ = cache.read(0, 2);
    let _ = cache.read(1, 2);
    let _ = cache.write(0, 1);
    assert_eq!(cache.byte_utilizations(), &[0, 0, 0, 0]);
    let _ = cache.read(4, 1);
    assert_eq!(cache.byte_utilizations(), &[0, 0, 1, 0]);
    let _ = cache.read(8, 4);
    assert_eq!(cache.byte_utilizations(), &[1, 0, 1, 0]);
    assert_eq!(cache.stats().byte_utilizations, vec![1, 0, 1, 0]);
}

#[test]
fn mismatched_lists_are_rejected() {
    assert!(matches!(
        MultilevelCache::new(&[1024, 2048], &[4], 64),
        Err(ConfigError::LevelCountMismatch { capacities: 2, associativities: 1 })
    ));
}

#[test]
fn degenerate_shapes_are_rejected() {
    assert!(matches!(MultilevelCache::new(&[], &[], 64), Err(ConfigError::NoLevels)));
    assert!(matches!(MultilevelCache::new(&[64], &[1], 0), Err(ConfigError::ZeroLineSize)));
    assert!(matches!(MultilevelCache::new(&[64], &[1], 48), Err(ConfigError::LineSizeNotPowerOfTwo(48))));
    assert!(matches!(MultilevelCache::new(&[64, 0], &[1, 1], 4), Err(ConfigError::ZeroCapacity { level: 1 })));
    assert!(matches!(MultilevelCache::new(&[64], &[0], 4), Err(ConfigError::ZeroAssociativity { level: 0 })));
    assert!(matches!(MultilevelCache::new(&[64, 1 << 33], &[1, 1], 1), Err(ConfigError::CapacityTooLarge { level: 1 })));
    assert!(matches!(MultilevelCache::new(&[1 << 33], &[1], 1 << 20), Err(ConfigError::CapacityTooLarge { level: 0 })));
}

#[test]
fn whole_address_space_fits() {
    // 4096 sets of 1 MiB lines use every address bit
    let cache = MultilevelCache::new(&[1 << 32], &[1], 1 << 20).unwrap();
    let geometry = cache.level(0).unwrap().geometry();
    assert_eq!((geometry.set_bits(), geometry.offset_bits(), geometry.tag_bits()), (12, 20, 0));
}

#[test]
fn shape_is_reported() {
    let cache = MultilevelCache::new(&[1024, 2048, 4096], &[4, 8, 8], 64).unwrap();
    assert_eq!(cache.level_count(), 3);
    assert_eq!(cache.line_size(), 64);
    assert_eq!(cache.byte_utilizations().len(), 64);
    assert_eq!(cache.level(0).unwrap().geometry().set_count(), 4);
    assert_eq!(cache.level(2).unwrap().associativity(), 8);
    assert!(cache.level(3).is_none());
    assert!(cache.resident_lines(3).is_empty());
}
