use std::fmt;
use std::time::{Duration, Instant};
use log::debug;
use serde::{Deserialize, Serialize};
use crate::address::{address_mask, Address};
use crate::config::HierarchyConfig;
use crate::error::{ConfigError, TraceError};
use crate::hex::{HEX_NIBBLE, INVALID_NIBBLE};
use crate::hierarchy::MultilevelCache;
use crate::line::AccessKind;

/// Every trace record is exactly this many bytes, including the trailing newline
pub const RECORD_LEN: usize = 40;
const ADDRESS_OFFSET: usize = 17;
const ADDRESS_SIZE: usize = 16;
const ADDRESS_UPPER: usize = ADDRESS_OFFSET + ADDRESS_SIZE;
const RW_MODE: usize = ADDRESS_UPPER + 1;
const SIZE: usize = RW_MODE + 2;

/// Which records of a trace are simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorOptions {
    /// Simulate reads
    pub track_loads: bool,
    /// Simulate writes
    pub track_stores: bool,
    /// Number of records to skip before simulating anything
    pub fast_forward: u64,
    /// Maximum number of records to simulate once fast forwarding is done
    pub execute_limit: Option<u64>,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            track_loads: true,
            track_stores: true,
            fast_forward: 0,
            execute_limit: None,
        }
    }
}

/// A decoded trace record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub address: Address,
    pub size: u8,
    pub kind: AccessKind,
}

/// The simulator feeds trace records to a hierarchy and collects the results.
///
/// It supports calling simulate multiple times, and will update the time taken to simulate and the
/// results accordingly. The fast forward and execute windows carry over between calls
#[derive(Debug)]
pub struct Simulator {
    hierarchy: MultilevelCache,
    names: Vec<String>,
    options: SimulatorOptions,
    skipped: u64,
    executed: u64,
    simulation_time: Duration,
}

/// The result of a simulation. Can be serialised to JSON or displayed as text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationReport {
    pub levels: Vec<String>,
    pub line_size: u32,
    pub fast_forward: u64,
    pub execute_limit: Option<u64>,
    pub skipped: u64,
    pub executed: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
    pub miss_ratio: f64,
    pub byte_utilizations: Vec<u64>,
}

impl Simulator {
    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A hierarchy configuration, usually resulting from parsing JSON
    /// * `options`: Which parts of the trace to simulate
    ///
    /// returns: Result<Simulator, ConfigError>
    pub fn new(config: &HierarchyConfig, options: SimulatorOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            hierarchy: MultilevelCache::from_config(config)?,
            names: config.names(),
            options,
            skipped: 0,
            executed: 0,
            simulation_time: Duration::ZERO,
        })
    }

    /// Simulates the cache using a reference to a byte array of trace records.
    ///
    /// The length must be a multiple of [`RECORD_LEN`]. Every record is decoded before any of them
    /// is simulated, so a malformed record anywhere in the trace leaves the hierarchy and the
    /// counters untouched. Records are read strictly sequentially, so a memory mapped trace can be
    /// advised as such. Stops early once the execute limit is reached
    ///
    /// # Arguments
    ///
    /// * `bytes`: The input byte array
    ///
    /// returns: Result<SimulationReport, TraceError>
    pub fn simulate(&mut self, bytes: &[u8]) -> Result<SimulationReport, TraceError> {
        if bytes.len() % RECORD_LEN != 0 {
            return Err(TraceError::PartialRecord { len: bytes.len(), record_len: RECORD_LEN });
        }
        debug!(
            "Simulating {} records, skipped {} and executed {} so far",
            bytes.len() / RECORD_LEN,
            self.skipped,
            self.executed
        );
        let start = Instant::now();
        let records = bytes
            .chunks_exact(RECORD_LEN)
            .enumerate()
            .map(|(index, buffer)| parse_record(index, buffer))
            .collect::<Result<Vec<_>, _>>();
        let result = records.map(|records| self.run(&records));
        self.simulation_time += start.elapsed();
        result?;
        Ok(self.report())
    }

    fn run(&mut self, records: &[TraceRecord]) {
        for record in records {
            if self.skipped < self.options.fast_forward {
                self.skipped += 1;
                continue;
            }
            if self.options.execute_limit.is_some_and(|limit| self.executed >= limit) {
                debug!("Execute limit reached after {} records", self.executed);
                break;
            }
            self.executed += 1;
            match record.kind {
                AccessKind::Read if self.options.track_loads => {
                    let _ = self.hierarchy.read(record.address, record.size);
                }
                AccessKind::Write if self.options.track_stores => {
                    let _ = self.hierarchy.write(record.address, record.size);
                }
                _ => {}
            }
        }
    }

    /// Summarises the results so far
    pub fn report(&self) -> SimulationReport {
        let hits = self.hierarchy.hits();
        let misses = self.hierarchy.misses();
        let total = hits + misses;
        let ratio = |n: u64| if total == 0 { 0.0 } else { n as f64 / total as f64 };
        SimulationReport {
            levels: self.names.clone(),
            line_size: self.hierarchy.line_size(),
            fast_forward: self.options.fast_forward,
            execute_limit: self.options.execute_limit,
            skipped: self.skipped,
            executed: self.executed,
            hits,
            misses,
            hit_ratio: ratio(hits),
            miss_ratio: ratio(misses),
            byte_utilizations: self.hierarchy.byte_utilizations().to_vec(),
        }
    }

    pub fn hierarchy(&self) -> &MultilevelCache {
        &self.hierarchy
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const RULE: &str = "===============================================";
        writeln!(f, "{RULE}")?;
        writeln!(f, "Levels: {}", self.levels.join(", "))?;
        writeln!(f, "Fast-forward: {}/{}", self.skipped, self.fast_forward)?;
        match self.execute_limit {
            Some(limit) => writeln!(f, "Execute: {}/{}", self.executed, limit)?,
            None => writeln!(f, "Execute: {}", self.executed)?,
        }
        writeln!(f, "Hits: {}", self.hits)?;
        writeln!(f, "Hit ratio: {}", self.hit_ratio)?;
        writeln!(f, "Misses: {}", self.misses)?;
        writeln!(f, "Miss ratio: {}", self.miss_ratio)?;
        for (i, count) in self.byte_utilizations.iter().enumerate() {
            writeln!(f, "Utilization {}: {}", i + 1, count)?;
        }
        writeln!(f, "{RULE}")
    }
}

/// Decodes one fixed width record
///
/// # Arguments
///
/// * `index`: Index of the record in the trace, for error reporting
/// * `buf`: The record bytes, [`RECORD_LEN`] of them
///
/// returns: Result<TraceRecord, TraceError>
pub fn parse_record(index: usize, buf: &[u8]) -> Result<TraceRecord, TraceError> {
    if buf.len() != RECORD_LEN {
        return Err(TraceError::PartialRecord { len: buf.len(), record_len: RECORD_LEN });
    }
    let address = buf[ADDRESS_OFFSET..ADDRESS_UPPER]
        .try_into()
        .ok()
        .and_then(parse_address)
        .ok_or(TraceError::InvalidHex { record: index })?;
    let kind = match buf[RW_MODE] {
        b'R' => AccessKind::Read,
        b'W' => AccessKind::Write,
        other => return Err(TraceError::InvalidMode { record: index, mode: other as char }),
    };
    let size = buf[SIZE..RECORD_LEN - 1]
        .try_into()
        .ok()
        .and_then(parse_size)
        .ok_or(TraceError::InvalidSize { record: index })?;
    let size = u8::try_from(size).map_err(|_| TraceError::AccessTooLarge { record: index, size })?;
    Ok(TraceRecord {
        // Traces hold 64-bit addresses, the simulated address space is 32 bits
        address: (address & address_mask()) as Address,
        size,
        kind,
    })
}

/// Parses a 64-bit value from a 16 byte hexadecimal address, or None if a digit isn't hex
///
/// Each digit is decoded with a 256 entry lookup table generated by build.rs, which is much
/// faster than going through from_str_radix for every record
///
/// # Examples
///
/// ```
/// use vcache::simulator::parse_address;
/// let address = b"000000000000000A";
/// assert_eq!(parse_address(address), Some(10));
/// assert_eq!(parse_address(b"00000000000000G0"), None);
/// ```
pub fn parse_address(buf: &[u8; 16]) -> Option<u64> {
    let mut res: u64 = 0;
    for &digit in buf {
        let nibble = HEX_NIBBLE[digit as usize];
        if nibble == INVALID_NIBBLE {
            return None;
        }
        res = res << 4 | nibble as u64;
    }
    Some(res)
}

/// Parses a three digit decimal size, or None if a character isn't a digit
///
/// # Examples
///
/// ```
/// use vcache::simulator::parse_size;
/// assert_eq!(parse_size(b"010"), Some(10));
/// assert_eq!(parse_size(b"0x1"), None);
/// ```
pub fn parse_size(buf: &[u8; 3]) -> Option<u16> {
    buf.iter().try_fold(0u16, |acc, &c| {
        c.is_ascii_digit().then(|| acc * 10 + (c - b'0') as u16)
    })
}
