use log::{debug, trace};
use serde::{Deserialize, Serialize};
use crate::address::Address;
use crate::cache::Cache;
use crate::config::{self, HierarchyConfig};
use crate::error::ConfigError;
use crate::line::{AccessKind, CacheLine, LineId, LineStore};

/// The outcome of one line-sized piece of an access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAccess {
    /// Base address of the line that was accessed
    pub line: Address,
    /// The level the line was found in, or None if it was fetched from memory
    pub hit_level: Option<usize>,
}

impl LineAccess {
    pub fn is_hit(&self) -> bool {
        self.hit_level.is_some()
    }
}

/// A snapshot of the hierarchy's counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HierarchyStats {
    pub hits: u64,
    pub misses: u64,
    pub byte_utilizations: Vec<u64>,
}

/// A hierarchy of caches sharing one line size. Level 0 is searched first.
///
/// Fresh lines always enter level 0. When a level has to make room, its least recently used line
/// moves out to the next level, and so on down the hierarchy. A line found in an outer level stays
/// where it is. When a line falls out of the last level it is removed from every level and its
/// utilization is recorded.
///
/// Every mutating call takes `&mut self`, so if several threads produce events they must share
/// the hierarchy behind a lock, one access at a time
#[derive(Debug)]
pub struct MultilevelCache {
    levels: Vec<Cache>,
    lines: LineStore,
    line_size: u32,
    hits: u64,
    misses: u64,
    byte_utilizations: Vec<u64>,
}

impl MultilevelCache {
    /// Creates a multilevel cache. The first level is given by the first entry of each list, and
    /// so on
    ///
    /// # Arguments
    ///
    /// * `capacities`: Capacity of each level in bytes
    /// * `associativities`: Associativity of each level, 1 for direct mapped
    /// * `line_size`: Bytes per line, shared by all levels
    ///
    /// returns: Result<MultilevelCache, ConfigError>
    pub fn new(capacities: &[u64], associativities: &[u32], line_size: u32) -> Result<Self, ConfigError> {
        config::validate(capacities, associativities, line_size)?;
        let levels: Vec<Cache> = capacities
            .iter()
            .zip(associativities)
            .map(|(&capacity, &associativity)| Cache::new(capacity, associativity, line_size))
            .collect();
        for (i, level) in levels.iter().enumerate() {
            let geometry = level.geometry();
            debug!(
                "Level {}: {} sets of {} ways, {} tag / {} set / {} offset bits",
                i,
                geometry.set_count(),
                level.associativity(),
                geometry.tag_bits(),
                geometry.set_bits(),
                geometry.offset_bits()
            );
        }
        Ok(Self {
            levels,
            lines: LineStore::new(),
            line_size,
            hits: 0,
            misses: 0,
            byte_utilizations: vec![0; line_size as usize],
        })
    }

    pub fn from_config(config: &HierarchyConfig) -> Result<Self, ConfigError> {
        Self::new(&config.capacities(), &config.associativities(), config.line_size)
    }

    /// Accesses the hierarchy for a load
    pub fn read(&mut self, address: Address, size: u8) -> Vec<LineAccess> {
        self.access(address, size, AccessKind::Read)
    }

    /// Accesses the hierarchy for a store
    pub fn write(&mut self, address: Address, size: u8) -> Vec<LineAccess> {
        self.access(address, size, AccessKind::Write)
    }

    /// Accesses `size` bytes starting at `address`, returning one entry per line touched
    ///
    /// Accesses which cross line boundaries are split, and each piece counts as its own hit or
    /// miss. A zero sized access touches nothing
    pub fn access(&mut self, address: Address, size: u8, kind: AccessKind) -> Vec<LineAccess> {
        // Line size is the same for every level, so L1 can compute offsets for all of them
        let offset = self.levels[0].geometry().line_offset(address);
        let mut bytes_to_end_of_line = self.line_size - offset;
        let mut accessed: u32 = 0;
        let mut remaining = size as u32;
        let mut touched = Vec::new();
        while remaining > 0 {
            let access_size = remaining.min(bytes_to_end_of_line);
            // access_size <= size, so it always fits
            touched.push(self.access_line(address.wrapping_add(accessed), access_size as u8, kind));
            accessed += access_size;
            remaining -= access_size;
            bytes_to_end_of_line = self.line_size;
        }
        touched
    }

    /// Resolves an access that lies within a single line
    fn access_line(&mut self, address: Address, size: u8, kind: AccessKind) -> LineAccess {
        let mut requested = self.levels[0]
            .access_line(address, size, kind, &mut self.lines)
            .map(|line| (line, 0));

        // Evicting returns None if there was already space in the set
        let mut displaced = match requested {
            Some(_) => None,
            None => self.levels[0].evict_lru(address),
        };

        for level in 1..self.levels.len() {
            if requested.is_none() {
                requested = self.levels[level]
                    .access_line(address, size, kind, &mut self.lines)
                    .map(|line| (line, level));
            }
            match displaced {
                Some(victim) => {
                    let victim_address = self.lines[victim].address();
                    let next = self.levels[level].evict_lru(victim_address);
                    let inserted = self.levels[level].insert(victim_address, victim);
                    assert!(inserted, "no room for {victim_address:#x} in level {level} after evicting");
                    displaced = next;
                }
                // Found, and nothing left to move down
                None if requested.is_some() => break,
                None => {}
            }
        }

        let access = match requested {
            Some((line, level)) => {
                self.hits += 1;
                LineAccess { line: self.lines[line].address(), hit_level: Some(level) }
            }
            None => {
                let line_address = self.levels[0].geometry().line_address(address);
                let line = self.lines.allocate(self.line_size, line_address);
                self.lines[line].access(address, size, kind);
                let inserted = self.levels[0].insert(line_address, line);
                assert!(inserted, "no room for {line_address:#x} in level 0 after evicting");
                self.misses += 1;
                LineAccess { line: line_address, hit_level: None }
            }
        };

        if let Some(victim) = displaced {
            self.evict_from_hierarchy(victim);
        }
        access
    }

    /// Removes a line which fell out of the last level from every level, records its
    /// utilization, and destroys it
    fn evict_from_hierarchy(&mut self, victim: LineId) {
        let address = self.lines[victim].address();
        for level in self.levels.iter_mut() {
            let removed = level.remove_line(address);
            debug_assert!(removed.is_none() || removed == Some(victim), "{address:#x} resident as two different lines");
        }
        let line = self.lines.release(victim);
        let utilization = line.utilization();
        // Only possible for a line that was never the target of its own access
        if utilization > 0 {
            self.byte_utilizations[utilization - 1] += 1;
        }
        trace!("Evicted: {line}");
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Bucket `i` counts lines that left the hierarchy with `i + 1` distinct bytes accessed
    pub fn byte_utilizations(&self) -> &[u64] {
        &self.byte_utilizations
    }

    pub fn stats(&self) -> HierarchyStats {
        HierarchyStats {
            hits: self.hits,
            misses: self.misses,
            byte_utilizations: self.byte_utilizations.clone(),
        }
    }

    pub fn line_size(&self) -> u32 {
        self.line_size
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, level: usize) -> Option<&Cache> {
        self.levels.get(level)
    }

    /// Base addresses of the lines resident in a level. Empty for a level that doesn't exist
    pub fn resident_lines(&self, level: usize) -> Vec<Address> {
        self.levels
            .get(level)
            .map(|cache| cache.resident_lines().map(|id| self.lines[id].address()).collect())
            .unwrap_or_default()
    }

    /// The resident line holding `address`, from the first level that has it
    pub fn line(&self, address: Address) -> Option<&CacheLine> {
        self.levels
            .iter()
            .find_map(|cache| cache.lookup(address))
            .map(|id| &self.lines[id])
    }

    /// Number of lines currently held anywhere in the hierarchy
    pub fn resident_line_count(&self) -> usize {
        self.lines.len()
    }
}
