// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Builder pattern for creating unified readers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DecoderConfig;
use crate::io::arena::LogBytes;
use crate::{CodecError, Result};

use super::strategy::ReadStrategy;

/// Builder for [`MavReader`](super::MavReader).
///
/// # Example
///
/// ```rust,no_run
/// use mavlog::io::{ReaderBuilder, ReadStrategy};
///
/// let reader = ReaderBuilder::new()
///     .path("flight.bin")
///     .strategy(ReadStrategy::Parallel)
///     .num_threads(4)
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReaderBuilder {
    path: Option<PathBuf>,
    config: Option<DecoderConfig>,
    strategy: ReadStrategy,
    num_threads: Option<usize>,
}

impl ReaderBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path to the log.
    pub fn path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the decoder configuration.
    pub fn config(mut self, config: DecoderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the reading strategy.
    pub fn strategy(mut self, strategy: ReadStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the number of threads for parallel reading.
    pub fn num_threads(mut self, count: usize) -> Self {
        self.num_threads = Some(count);
        self
    }

    /// Build the reader.
    ///
    /// The path falls back to the configuration's `file_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is set, the file cannot be mapped or the
    /// configuration is invalid.
    pub fn build(self) -> Result<super::MavReader> {
        let config = self.config.unwrap_or_default();
        let path = self
            .path
            .or_else(|| config.file_path.clone())
            .ok_or_else(|| CodecError::config("file_path", "no input file given"))?;

        if !path.exists() {
            return Err(CodecError::io(
                "ReaderBuilder",
                format!("File not found: {}", path.display()),
            ));
        }

        config.validate()?;
        let source = LogBytes::open(&path)?;

        Ok(super::MavReader {
            source: Arc::new(source),
            config: Arc::new(config),
            strategy: self.strategy,
            num_threads: self.num_threads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path() {
        let err = ReaderBuilder::new().build().unwrap_err();
        assert!(matches!(err, CodecError::Config { .. }));
    }

    #[test]
    fn test_nonexistent_file() {
        let err = ReaderBuilder::new()
            .path("/nonexistent/mavlog/flight.bin")
            .build()
            .unwrap_err();
        assert!(matches!(err, CodecError::Io { .. }));
    }

    #[test]
    fn test_path_from_config() {
        let path = std::env::temp_dir().join(format!("mavlog_builder_{}.bin", std::process::id()));
        std::fs::write(&path, [0u8; 16]).unwrap();

        let config = DecoderConfig {
            file_path: Some(path.clone()),
            ..DecoderConfig::default()
        };
        let reader = ReaderBuilder::new()
            .config(config)
            .strategy(ReadStrategy::Sequential)
            .build()
            .unwrap();
        assert_eq!(reader.file_size(), 16);
        assert_eq!(reader.strategy(), ReadStrategy::Sequential);

        drop(reader);
        let _ = std::fs::remove_file(&path);
    }
}
