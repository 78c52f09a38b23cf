//! # VCache
//!
//! VCache simulates a multi-level, set-associative cache hierarchy to measure how well programs use
//! their cache lines
//!
//! Memory accesses go in as (address, size, read/write) events. The hierarchy models which lines
//! would be resident at each level under least recently used replacement, counts hits and misses,
//! and records how many bytes of each line were touched before it left the hierarchy
//!
//! The core is pure in-memory simulation. A trace replay driver and JSON configuration are
//! provided on top of it for the command line tool

/// Address types and the tag / set / offset split of an address
pub mod address;

/// Cache lines and the arena that owns them
pub mod line;

/// A single associative set with LRU replacement
pub mod set;

/// A single cache level made of sets
pub mod cache;

/// The multilevel hierarchy, which is the main entry point
pub mod hierarchy;

/// Contains definitions for the JSON configuration format
pub mod config;

/// Error types for configuration and trace problems
pub mod error;

/// Replays trace files through a hierarchy
pub mod simulator;

/// Loading trace files
pub mod io;

// Generated from the build.rs, private
mod hex {
    include!(concat!(env!("OUT_DIR"), "/hex.rs"));
}
#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;

pub use hierarchy::{LineAccess, MultilevelCache};
pub use line::AccessKind;
