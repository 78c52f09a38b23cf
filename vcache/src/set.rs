use std::collections::BTreeMap;
use crate::address::Tag;
use crate::line::LineId;

/// One way of a set, linked into the recency list by slot index
#[derive(Debug, Clone, Copy)]
struct Slot {
    tag: Tag,
    line: LineId,
    // Towards the MRU end
    prev: Option<usize>,
    // Towards the LRU end
    next: Option<usize>,
}

/// An associative set with least recently used replacement
///
/// Lines live in a small slot arena. `tags` maps a tag to its slot, and the slots form a doubly
/// linked list from `head` (most recently used) to `tail` (least recently used). Both structures
/// always hold exactly the same lines.
///
/// The set never creates or destroys lines, it only holds handles to lines owned by the hierarchy
#[derive(Debug)]
pub struct CacheSet {
    associativity: u32,
    slots: Vec<Slot>,
    free: Vec<usize>,
    tags: BTreeMap<Tag, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl CacheSet {
    pub fn new(associativity: u32) -> Self {
        Self {
            associativity,
            slots: Vec::with_capacity(associativity as usize),
            free: Vec::new(),
            tags: BTreeMap::new(),
            head: None,
            tail: None,
        }
    }

    /// Inserts a line at the most recently used position, returning true on success
    ///
    /// If the same line is already mapped under `tag` it is just moved to the front. Fails without
    /// touching anything if the set is full (evict first), or if a different line already has
    /// this tag
    pub fn insert(&mut self, tag: Tag, line: LineId) -> bool {
        if let Some(&slot) = self.tags.get(&tag) {
            if self.slots[slot].line != line {
                return false;
            }
            self.move_to_front(slot);
            return true;
        }
        if self.is_full() {
            return false;
        }
        let entry = Slot { tag, line, prev: None, next: None };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = entry;
                slot
            }
            None => {
                self.slots.push(entry);
                self.slots.len() - 1
            }
        };
        self.push_front(slot);
        let _ = self.tags.insert(tag, slot);
        true
    }

    /// Evicts the least recently used line, but only when the set is full
    ///
    /// A set with space left returns None, which tells the caller it can insert without evicting
    pub fn evict_lru(&mut self) -> Option<LineId> {
        if !self.is_full() {
            return None;
        }
        let slot = self.tail?;
        Some(self.remove_slot(slot))
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.tags.contains_key(&tag)
    }

    pub fn lookup(&self, tag: Tag) -> Option<LineId> {
        self.tags.get(&tag).map(|&slot| self.slots[slot].line)
    }

    /// Looks up a line and marks it most recently used
    pub fn touch(&mut self, tag: Tag) -> Option<LineId> {
        let slot = *self.tags.get(&tag)?;
        self.move_to_front(slot);
        Some(self.slots[slot].line)
    }

    /// Removes the line with this tag regardless of where it is in the recency order
    pub fn remove(&mut self, tag: Tag) -> Option<LineId> {
        let slot = *self.tags.get(&tag)?;
        Some(self.remove_slot(slot))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.associativity as usize
    }

    pub fn associativity(&self) -> u32 {
        self.associativity
    }

    /// Resident lines, most recently used first
    pub fn lines(&self) -> impl Iterator<Item = LineId> + '_ {
        std::iter::successors(self.head, move |&slot| self.slots[slot].next)
            .map(move |slot| self.slots[slot].line)
    }

    fn remove_slot(&mut self, slot: usize) -> LineId {
        self.unlink(slot);
        let Slot { tag, line, .. } = self.slots[slot];
        let _ = self.tags.remove(&tag);
        self.free.push(slot);
        line
    }

    fn move_to_front(&mut self, slot: usize) {
        if self.head != Some(slot) {
            self.unlink(slot);
            self.push_front(slot);
        }
    }

    fn push_front(&mut self, slot: usize) {
        self.slots[slot].prev = None;
        self.slots[slot].next = self.head;
        match self.head {
            Some(old) => self.slots[old].prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let Slot { prev, next, .. } = self.slots[slot];
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[slot].prev = None;
        self.slots[slot].next = None;
    }
}
