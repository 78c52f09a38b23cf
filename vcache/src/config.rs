use serde::{Deserialize, Serialize};
use crate::address::{offset_bit_width, set_bit_width, set_count, ADDRESS_BITS};
use crate::error::ConfigError;

/// Line size used when a configuration doesn't give one
pub const DEFAULT_LINE_SIZE: u32 = 64;

/// A cache hierarchy configuration. The first level is the one searched first
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct HierarchyConfig {
    /// Bytes per line, shared by every level
    #[serde(default = "default_line_size")]
    pub line_size: u32,
    pub levels: Vec<LevelConfig>,
}

/// A configuration for a single level
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LevelConfig {
    #[serde(default)]
    pub name: String,
    /// Capacity in bytes
    pub size: u64,
    pub associativity: AssociativityConfig,
}

/// The associativity of a level, either a number of ways or one of the named kinds
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AssociativityConfig {
    Ways(u32),
    Kind(CacheKindConfig),
}

/// The named kinds of cache - direct, full, 2way, 4way, or 8way
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum CacheKindConfig {
    #[serde(alias = "direct")]
    Direct,
    #[serde(alias = "full")]
    Full,
    #[serde(alias = "2way")]
    TwoWay,
    #[serde(alias = "4way")]
    FourWay,
    #[serde(alias = "8way")]
    EightWay,
}

fn default_line_size() -> u32 {
    DEFAULT_LINE_SIZE
}

impl AssociativityConfig {
    /// Resolves to a number of ways. A fully associative cache has a single set holding every line,
    /// with a partial line at the end of the capacity rounded up to a whole one
    pub fn ways(&self, size: u64, line_size: u32) -> u32 {
        match self {
            AssociativityConfig::Ways(ways) => *ways,
            AssociativityConfig::Kind(CacheKindConfig::Direct) => 1,
            AssociativityConfig::Kind(CacheKindConfig::Full) => {
                u32::try_from(size.div_ceil(line_size.max(1) as u64)).unwrap_or(u32::MAX)
            }
            AssociativityConfig::Kind(CacheKindConfig::TwoWay) => 2,
            AssociativityConfig::Kind(CacheKindConfig::FourWay) => 4,
            AssociativityConfig::Kind(CacheKindConfig::EightWay) => 8,
        }
    }
}

impl HierarchyConfig {
    /// Builds a configuration from separate per-level lists, the way the command line provides them
    ///
    /// Levels are named L1, L2, ... in order
    pub fn from_lists(line_size: u32, capacities: &[u64], associativities: &[u32]) -> Result<Self, ConfigError> {
        if capacities.len() != associativities.len() {
            return Err(ConfigError::LevelCountMismatch {
                capacities: capacities.len(),
                associativities: associativities.len(),
            });
        }
        let levels = capacities
            .iter()
            .zip(associativities)
            .enumerate()
            .map(|(i, (&size, &ways))| LevelConfig {
                name: format!("L{}", i + 1),
                size,
                associativity: AssociativityConfig::Ways(ways),
            })
            .collect();
        Ok(Self { line_size, levels })
    }

    /// Parses a JSON configuration
    pub fn from_json(reader: impl std::io::Read) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn capacities(&self) -> Vec<u64> {
        self.levels.iter().map(|l| l.size).collect()
    }

    pub fn associativities(&self) -> Vec<u32> {
        self.levels.iter().map(|l| l.associativity.ways(l.size, self.line_size)).collect()
    }

    /// Level names, falling back to L1, L2, ... for unnamed levels
    pub fn names(&self) -> Vec<String> {
        self.levels
            .iter()
            .enumerate()
            .map(|(i, l)| if l.name.is_empty() { format!("L{}", i + 1) } else { l.name.clone() })
            .collect()
    }
}

/// Checks that a hierarchy can be built from these parameters
pub fn validate(capacities: &[u64], associativities: &[u32], line_size: u32) -> Result<(), ConfigError> {
    if capacities.len() != associativities.len() {
        return Err(ConfigError::LevelCountMismatch {
            capacities: capacities.len(),
            associativities: associativities.len(),
        });
    }
    if capacities.is_empty() {
        return Err(ConfigError::NoLevels);
    }
    if line_size == 0 {
        return Err(ConfigError::ZeroLineSize);
    }
    if !line_size.is_power_of_two() {
        return Err(ConfigError::LineSizeNotPowerOfTwo(line_size));
    }
    for (level, (&capacity, &associativity)) in capacities.iter().zip(associativities).enumerate() {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity { level });
        }
        if associativity == 0 {
            return Err(ConfigError::ZeroAssociativity { level });
        }
        let set_bits = set_bit_width(set_count(capacity, associativity, line_size));
        if set_bits as u32 + offset_bit_width(line_size) as u32 > ADDRESS_BITS as u32 {
            return Err(ConfigError::CapacityTooLarge { level });
        }
    }
    Ok(())
}
