// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Unified reader with strategy selection.
//!
//! [`MavReader`] maps a log once and hands it to either the sequential or the
//! parallel reader. Both produce the same messages in the same order.
//!
//! # Example
//!
//! ```rust,no_run
//! use mavlog::io::{MavReader, ReadOptions, TypeFilter};
//!
//! let reader = MavReader::open("flight.bin")?;
//! let options = ReadOptions::default().with_filter(TypeFilter::include(["GPS"]));
//! let (messages, stats) = reader.parse_all(&options)?;
//! println!("{} GPS fixes ({stats})", messages.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod strategy;

pub use builder::ReaderBuilder;
pub use strategy::{ReadStrategy, PARALLEL_THRESHOLD};

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::config::DecoderConfig;
use crate::io::arena::LogBytes;
use crate::io::metadata::{LogInfo, ParseStats};
use crate::io::parallel::ParallelReader;
use crate::io::sequential::SequentialReader;
use crate::io::traits::ReadOptions;
use crate::{DecodedMessage, Result};

/// Log reader that delegates to the selected strategy.
#[derive(Debug)]
pub struct MavReader {
    source: Arc<LogBytes>,
    config: Arc<DecoderConfig>,
    strategy: ReadStrategy,
    num_threads: Option<usize>,
}

impl MavReader {
    /// Open a log with the default configuration and automatic strategy.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        ReaderBuilder::new().path(path).build()
    }

    /// Open a log with an explicit configuration.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: DecoderConfig) -> Result<Self> {
        ReaderBuilder::new().path(path).config(config).build()
    }

    /// Read an in-memory log.
    pub fn from_bytes(data: Vec<u8>, config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source: Arc::new(LogBytes::from_vec(data)),
            config: Arc::new(config),
            strategy: ReadStrategy::Auto,
            num_threads: None,
        })
    }

    /// Force a strategy.
    pub fn with_strategy(mut self, strategy: ReadStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The strategy that will be used, with Auto resolved.
    pub fn strategy(&self) -> ReadStrategy {
        self.strategy.resolve(self.source.len())
    }

    /// Log size in bytes.
    pub fn file_size(&self) -> usize {
        self.source.len()
    }

    /// Source path, if the log came from a file.
    pub fn path(&self) -> Option<&str> {
        self.source.path()
    }

    /// The configuration in use.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// A sequential reader over the shared log.
    pub fn sequential(&self) -> Result<SequentialReader> {
        SequentialReader::from_source(Arc::clone(&self.source), Arc::clone(&self.config))
    }

    /// A parallel reader over the shared log. Runs the schema pre-scan.
    pub fn parallel(&self) -> Result<ParallelReader> {
        ParallelReader::from_source(Arc::clone(&self.source), Arc::clone(&self.config))
    }

    /// Decode the whole log with the selected strategy.
    pub fn parse_all(&self, options: &ReadOptions) -> Result<(Vec<DecodedMessage>, ParseStats)> {
        let mut options = options.clone();
        if options.num_threads.is_none() {
            options.num_threads = self.num_threads;
        }

        match self.strategy() {
            ReadStrategy::Parallel => self.parallel()?.parse_all_with_stats(&options),
            _ => {
                let start = Instant::now();
                let mut reader = self.sequential()?.with_filter(options.filter.clone());
                if let Some(token) = options.cancel.clone() {
                    reader = reader.with_cancel(token);
                }
                let messages = reader.parse_all();
                let stats = ParseStats {
                    messages: messages.len() as u64,
                    chunks: 1,
                    bytes: self.file_size() as u64,
                    elapsed: start.elapsed(),
                };
                info!(%stats, "Sequential decode complete");
                Ok((messages, stats))
            }
        }
    }

    /// Frame every record without decoding payloads.
    pub fn summarize(&self) -> Result<LogInfo> {
        Ok(self.sequential()?.summarize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::filter::TypeFilter;
    use crate::schema::record::tests::schema_bytes;

    fn sample_log() -> Vec<u8> {
        let mut log = schema_bytes(4, 5, "TEMP", "c", "Temp");
        for v in [2150i16, 2160, -40] {
            log.extend_from_slice(&[0xA3, 0x95, 4]);
            log.extend_from_slice(&v.to_le_bytes());
        }
        log
    }

    #[test]
    fn test_strategies_agree() {
        let reader = MavReader::from_bytes(sample_log(), DecoderConfig::default()).unwrap();
        assert_eq!(reader.strategy(), ReadStrategy::Sequential);

        let options = ReadOptions::default();
        let (sequential, seq_stats) = reader.parse_all(&options).unwrap();
        let reader = reader.with_strategy(ReadStrategy::Parallel);
        let (parallel, _) = reader.parse_all(&options.with_threads(3)).unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), 4);
        assert_eq!(seq_stats.chunks, 1);
        assert_eq!(
            sequential[1].get("Temp").and_then(|v| v.as_f64()),
            Some(21.5)
        );
        assert_eq!(
            sequential[3].get("Temp").and_then(|v| v.as_f64()),
            Some(-0.4)
        );
    }

    #[test]
    fn test_filter_through_facade() {
        let reader = MavReader::from_bytes(sample_log(), DecoderConfig::default()).unwrap();
        let options = ReadOptions::default().with_filter(TypeFilter::include(["FMT"]));
        let (msgs, _) = reader.parse_all(&options).unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].get("Name").and_then(|v| v.as_str()), Some("TEMP"));
    }

    #[test]
    fn test_summarize() {
        let reader = MavReader::from_bytes(sample_log(), DecoderConfig::default()).unwrap();
        let info = reader.summarize().unwrap();
        assert_eq!(info.data_records, 3);
        assert_eq!(info.types.len(), 1);
        assert_eq!(info.types[0].name, "TEMP");
    }

    #[test]
    fn test_debug_output() {
        let reader = MavReader::from_bytes(sample_log(), DecoderConfig::default()).unwrap();
        let text = format!("{reader:?}");
        assert!(text.starts_with("MavReader"));
        assert!(text.contains("Auto"));
    }
}
