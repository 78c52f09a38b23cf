use crate::address::{Address, Geometry};
use crate::line::{AccessKind, LineId, LineStore};
use crate::set::CacheSet;

/// A single level of the hierarchy, e.g. the L1
///
/// This is a thin dispatch layer. Every operation picks the set for the address using the
/// geometry and forwards to it. Sets are created the first time a line is put in them; probing a
/// set which was never touched just reports a miss.
///
/// A level never moves lines between its own sets
#[derive(Debug)]
pub struct Cache {
    geometry: Geometry,
    associativity: u32,
    sets: Vec<Option<CacheSet>>,
}

impl Cache {
    /// Creates an empty cache level
    ///
    /// # Arguments
    ///
    /// * `capacity`: The size of the cache in bytes
    /// * `associativity`: The number of lines per set, 1 for direct mapped
    /// * `line_size`: The number of bytes per line
    ///
    /// returns: Cache
    pub fn new(capacity: u64, associativity: u32, line_size: u32) -> Self {
        let geometry = Geometry::new(capacity, associativity, line_size);
        let mut sets = Vec::new();
        sets.resize_with(geometry.set_slots(), || None);
        Self {
            geometry,
            associativity,
            sets,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn associativity(&self) -> u32 {
        self.associativity
    }

    /// Inserts a line whose base address is `address`. Returns false if the set is full, in which
    /// case [`Cache::evict_lru`] must be called first
    pub fn insert(&mut self, address: Address, line: LineId) -> bool {
        let tag = self.geometry.tag(address);
        self.set_mut(address).insert(tag, line)
    }

    /// Evicts the least recently used line from the set `address` maps to, if that set is full
    pub fn evict_lru(&mut self, address: Address) -> Option<LineId> {
        let index = self.geometry.set_index(address) as usize;
        self.sets[index].as_mut()?.evict_lru()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.set(address).is_some_and(|set| set.contains(self.geometry.tag(address)))
    }

    pub fn lookup(&self, address: Address) -> Option<LineId> {
        self.set(address)?.lookup(self.geometry.tag(address))
    }

    /// Looks up the line holding `address` and, if it's resident, applies the access to it and
    /// marks it most recently used
    ///
    /// The caller must make sure `[address, address + size)` doesn't cross a line boundary
    pub fn access_line(&mut self, address: Address, size: u8, kind: AccessKind, lines: &mut LineStore) -> Option<LineId> {
        let tag = self.geometry.tag(address);
        let index = self.geometry.set_index(address) as usize;
        let line = self.sets[index].as_mut()?.touch(tag)?;
        lines[line].access(address, size, kind);
        Some(line)
    }

    /// Removes the line holding `address` wherever it is in its set's recency order
    pub fn remove_line(&mut self, address: Address) -> Option<LineId> {
        let tag = self.geometry.tag(address);
        let index = self.geometry.set_index(address) as usize;
        self.sets[index].as_mut()?.remove(tag)
    }

    /// All resident lines, set by set, most recently used first within each set
    pub fn resident_lines(&self) -> impl Iterator<Item = LineId> + '_ {
        self.sets.iter().flatten().flat_map(|set| set.lines())
    }

    /// Number of sets which have been touched so far
    pub fn initialised_set_count(&self) -> usize {
        self.sets.iter().filter(|s| s.is_some()).count()
    }

    fn set(&self, address: Address) -> Option<&CacheSet> {
        self.sets[self.geometry.set_index(address) as usize].as_ref()
    }

    fn set_mut(&mut self, address: Address) -> &mut CacheSet {
        let index = self.geometry.set_index(address) as usize;
        let associativity = self.associativity;
        self.sets[index].get_or_insert_with(|| CacheSet::new(associativity))
    }
}
