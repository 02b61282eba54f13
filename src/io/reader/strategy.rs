// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Reading strategies.
//!
//! - **Sequential**: one scanner over the whole log, schemas registered as met
//! - **Parallel**: head pre-scan, record-aligned chunks decoded concurrently
//! - **Auto**: parallel for logs above [`PARALLEL_THRESHOLD`], sequential below

use std::fmt;
use std::str::FromStr;

use crate::CodecError;

/// Logs at least this large are decoded in parallel by [`ReadStrategy::Auto`].
pub const PARALLEL_THRESHOLD: usize = 8 * 1024 * 1024;

/// Reading strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadStrategy {
    /// Sequential reading - one record at a time
    Sequential,
    /// Parallel reading - chunks decoded concurrently
    Parallel,
    /// Choose by log size
    #[default]
    Auto,
}

impl ReadStrategy {
    /// Resolve the Auto strategy to a concrete strategy.
    pub fn resolve(&self, file_size: usize) -> ReadStrategy {
        match self {
            ReadStrategy::Auto if file_size >= PARALLEL_THRESHOLD => ReadStrategy::Parallel,
            ReadStrategy::Auto => ReadStrategy::Sequential,
            other => *other,
        }
    }

    /// Check if this is the sequential strategy.
    pub fn is_sequential(&self) -> bool {
        matches!(self, ReadStrategy::Sequential)
    }

    /// Check if this is the parallel strategy.
    pub fn is_parallel(&self) -> bool {
        matches!(self, ReadStrategy::Parallel)
    }

    /// Check if this is the auto strategy.
    pub fn is_auto(&self) -> bool {
        matches!(self, ReadStrategy::Auto)
    }
}

impl fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadStrategy::Sequential => write!(f, "sequential"),
            ReadStrategy::Parallel => write!(f, "parallel"),
            ReadStrategy::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ReadStrategy {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(ReadStrategy::Sequential),
            "parallel" | "par" => Ok(ReadStrategy::Parallel),
            "auto" => Ok(ReadStrategy::Auto),
            other => Err(CodecError::parse("ReadStrategy", format!("unknown strategy '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(ReadStrategy::Auto.resolve(0), ReadStrategy::Sequential);
        assert_eq!(
            ReadStrategy::Auto.resolve(PARALLEL_THRESHOLD - 1),
            ReadStrategy::Sequential
        );
        assert_eq!(
            ReadStrategy::Auto.resolve(PARALLEL_THRESHOLD),
            ReadStrategy::Parallel
        );
        assert_eq!(ReadStrategy::Sequential.resolve(usize::MAX), ReadStrategy::Sequential);
        assert_eq!(ReadStrategy::Parallel.resolve(0), ReadStrategy::Parallel);
    }

    #[test]
    fn test_predicates() {
        assert!(ReadStrategy::Sequential.is_sequential());
        assert!(ReadStrategy::Parallel.is_parallel());
        assert!(ReadStrategy::default().is_auto());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Parallel".parse::<ReadStrategy>().unwrap(), ReadStrategy::Parallel);
        assert_eq!("seq".parse::<ReadStrategy>().unwrap(), ReadStrategy::Sequential);
        assert!("fast".parse::<ReadStrategy>().is_err());
        assert_eq!(ReadStrategy::Auto.to_string(), "auto");
    }
}
