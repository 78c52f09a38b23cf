/// A simulated memory address. The simulator models a 32-bit address space
pub type Address = u32;

/// The tag bits of an address, shifted down so they start at bit 0
pub type Tag = u32;

/// Index of a set within a single cache level
pub type SetIndex = u32;

/// Byte offset of an address within its cache line
pub type LineOffset = u32;

/// Width of the simulated address space in bits
pub const ADDRESS_BITS: u8 = Address::BITS as u8;

/// Number of bits needed to represent `n` distinct values, i.e. ceil(log2(n))
///
/// Values which aren't powers of two round up, so 3 needs 2 bits. 0 and 1 both need no bits.
const fn ceil_log2(n: u64) -> u8 {
    if n <= 1 {
        0
    } else {
        (u64::BITS - (n - 1).leading_zeros()) as u8
    }
}

/// Returns the number of sets in a cache of `capacity` bytes with `associativity` ways and
/// `line_size` byte lines, rounding up
///
/// # Arguments
///
/// * `capacity`: Capacity of the cache in bytes
/// * `associativity`: Lines per set
/// * `line_size`: Bytes per line
///
/// returns: u64
pub fn set_count(capacity: u64, associativity: u32, line_size: u32) -> u64 {
    capacity.div_ceil(associativity as u64 * line_size as u64)
}

/// Returns the number of bits needed to address a byte within a `line_size` byte line
pub fn offset_bit_width(line_size: u32) -> u8 {
    ceil_log2(line_size as u64)
}

/// Returns the number of bits needed to select one of `set_count` sets
pub fn set_bit_width(set_count: u64) -> u8 {
    ceil_log2(set_count)
}

/// Returns the number of bits left over for the tag once the set and offset bits are taken
pub fn tag_bit_width(set_bits: u8, offset_bits: u8) -> u8 {
    ADDRESS_BITS - (set_bits + offset_bits)
}

/// A mask covering the whole simulated address space. Wider addresses, such as the 64-bit ones in
/// trace files, are truncated with this before they reach a cache
pub fn address_mask() -> u64 {
    (1u64 << ADDRESS_BITS) - 1
}

/// The tag / set / offset partition of an address for one cache shape
///
/// Computed once per cache. All of the accessors use the same partition, so for any address
/// `tag`, `set_index` and `line_offset` together reconstruct it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    set_count: u64,
    line_size: u32,
    offset_bits: u8,
    set_bits: u8,
    tag_bits: u8,
}

impl Geometry {
    pub fn new(capacity: u64, associativity: u32, line_size: u32) -> Self {
        let set_count = set_count(capacity, associativity, line_size);
        let offset_bits = offset_bit_width(line_size);
        let set_bits = set_bit_width(set_count);
        Self {
            set_count,
            line_size,
            offset_bits,
            set_bits,
            tag_bits: tag_bit_width(set_bits, offset_bits),
        }
    }

    pub fn set_count(&self) -> u64 {
        self.set_count
    }

    /// Number of set indices the set bits can express. Equal to `set_count` when it is a power of
    /// two, larger otherwise
    pub fn set_slots(&self) -> usize {
        1usize << self.set_bits
    }

    pub fn line_size(&self) -> u32 {
        self.line_size
    }

    pub fn offset_bits(&self) -> u8 {
        self.offset_bits
    }

    pub fn set_bits(&self) -> u8 {
        self.set_bits
    }

    pub fn tag_bits(&self) -> u8 {
        self.tag_bits
    }

    // Shifts are done in u64, set_bits + offset_bits may be the full 32 bits
    pub fn tag(&self, address: Address) -> Tag {
        ((address as u64 >> (self.set_bits + self.offset_bits)) & address_mask()) as Tag
    }

    pub fn set_index(&self, address: Address) -> SetIndex {
        ((address as u64 >> self.offset_bits) & ((1u64 << self.set_bits) - 1)) as SetIndex
    }

    pub fn line_offset(&self, address: Address) -> LineOffset {
        (address as u64 & ((1u64 << self.offset_bits) - 1)) as LineOffset
    }

    /// The base address of the line containing `address`
    pub fn line_address(&self, address: Address) -> Address {
        address - self.line_offset(address)
    }
}
