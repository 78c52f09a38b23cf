use std::fmt;
use std::ops::{Index, IndexMut};
use crate::address::Address;

/// Whether an access reads or writes memory. Both touch the same bytes, only writes dirty a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
}

/// A line resident somewhere in the hierarchy
///
/// Tracks which bytes were accessed while it was resident, which is what the utilization
/// histogram is built from when the line finally leaves the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLine {
    address: Address,
    accessed_bytes: Vec<bool>,
    dirty: bool,
}

impl CacheLine {
    /// Creates a line with no bytes accessed
    ///
    /// # Arguments
    ///
    /// * `line_size`: The number of bytes in the line
    /// * `address`: The address of the first byte in the line
    ///
    /// returns: CacheLine
    pub fn new(line_size: u32, address: Address) -> Self {
        Self {
            address,
            accessed_bytes: vec![false; line_size as usize],
            dirty: false,
        }
    }

    /// The base address of the line
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn read(&mut self, address: Address, size: u8) {
        self.access_bytes(address, size);
    }

    pub fn write(&mut self, address: Address, size: u8) {
        self.access_bytes(address, size);
        self.dirty = true;
    }

    pub fn access(&mut self, address: Address, size: u8, kind: AccessKind) {
        match kind {
            AccessKind::Read => self.read(address, size),
            AccessKind::Write => self.write(address, size),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bit `i` is set iff byte `i` of the line was accessed
    pub fn accessed_bytes(&self) -> &[bool] {
        &self.accessed_bytes
    }

    /// Number of distinct bytes accessed so far
    pub fn utilization(&self) -> usize {
        self.accessed_bytes.iter().filter(|a| **a).count()
    }

    /// Marks `[address, address + size)` as accessed.
    ///
    /// Panics if the range isn't inside the line. Truncating instead would silently skew the
    /// utilization statistics
    fn access_bytes(&mut self, address: Address, size: u8) {
        let start = address.checked_sub(self.address).map(|s| s as usize);
        let end = start.map(|s| s + size as usize);
        match (start, end) {
            (Some(start), Some(end)) if end <= self.accessed_bytes.len() => {
                self.accessed_bytes[start..end].fill(true);
            }
            _ => panic!(
                "Access of {size} bytes at {address:#x} is outside the {} byte line at {:#x}",
                self.accessed_bytes.len(),
                self.address
            ),
        }
    }
}

impl fmt::Display for CacheLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address: {:x}, Utilization: ", self.address)?;
        for accessed in &self.accessed_bytes {
            f.write_str(if *accessed { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Handle to a line in a [`LineStore`]. Sets hold these rather than the lines themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(usize);

/// Arena owning every line resident in a hierarchy
///
/// Only the hierarchy allocates and releases lines. Released slots are reused, so a `LineId` must
/// not be used after its line is released
#[derive(Debug, Default)]
pub struct LineStore {
    lines: Vec<Option<CacheLine>>,
    free: Vec<usize>,
}

impl LineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh line, conceptually fetched from memory
    pub fn allocate(&mut self, line_size: u32, address: Address) -> LineId {
        let line = CacheLine::new(line_size, address);
        match self.free.pop() {
            Some(slot) => {
                self.lines[slot] = Some(line);
                LineId(slot)
            }
            None => {
                self.lines.push(Some(line));
                LineId(self.lines.len() - 1)
            }
        }
    }

    /// Removes a line from the store, handing it back to the caller
    pub fn release(&mut self, id: LineId) -> CacheLine {
        let line = self.lines[id.0].take().unwrap_or_else(|| panic!("{id:?} was already released"));
        self.free.push(id.0);
        line
    }

    pub fn get(&self, id: LineId) -> Option<&CacheLine> {
        self.lines.get(id.0).and_then(Option::as_ref)
    }

    /// Number of live lines
    pub fn len(&self) -> usize {
        self.lines.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Index<LineId> for LineStore {
    type Output = CacheLine;

    fn index(&self, id: LineId) -> &CacheLine {
        self.get(id).unwrap_or_else(|| panic!("{id:?} is not a live line"))
    }
}

impl IndexMut<LineId> for LineStore {
    fn index_mut(&mut self, id: LineId) -> &mut CacheLine {
        self.lines
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("{id:?} is not a live line"))
    }
}
