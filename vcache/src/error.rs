use thiserror::Error;

/// Problems with a hierarchy description. The hierarchy can't be built from it
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A hierarchy needs at least one level
    #[error("The cache hierarchy has no levels")]
    NoLevels,

    /// Each level needs both a capacity and an associativity
    #[error("Got {capacities} cache capacities but {associativities} associativities, each level needs one of each")]
    LevelCountMismatch {
        capacities: usize,
        associativities: usize,
    },

    /// The declared number of levels disagrees with the per-level lists
    #[error("Expected {expected} cache levels but got {capacities} capacities and {associativities} associativities")]
    DeclaredLevelMismatch {
        expected: usize,
        capacities: usize,
        associativities: usize,
    },

    #[error("The line size must be at least one byte")]
    ZeroLineSize,

    #[error("The line size must be a power of two, got {0}")]
    LineSizeNotPowerOfTwo(u32),

    #[error("Level {level} has a capacity of 0 bytes")]
    ZeroCapacity { level: usize },

    #[error("Level {level} has an associativity of 0")]
    ZeroAssociativity { level: usize },

    /// The set and offset bits of a level don't fit in an address
    #[error("Level {level} has more sets than a 32-bit address can index")]
    CapacityTooLarge { level: usize },

    #[error("Couldn't parse the cache configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Problems with a trace file. `record` is the zero based index of the offending record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("The trace is {len} bytes long, which isn't a whole number of {record_len} byte records")]
    PartialRecord { len: usize, record_len: usize },

    #[error("Record {record} has an invalid hex digit in its address")]
    InvalidHex { record: usize },

    #[error("Record {record} has access mode {mode:?}, expected 'R' or 'W'")]
    InvalidMode { record: usize, mode: char },

    #[error("Record {record} has a size which isn't a decimal number")]
    InvalidSize { record: usize },

    #[error("Record {record} accesses {size} bytes, at most 255 are supported")]
    AccessTooLarge { record: usize, size: u16 },
}
