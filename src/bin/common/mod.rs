// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

mod logging;

pub use logging::{init_logging, LogFormat, LogLevel};

use std::io::IsTerminal as _;
use std::path::Path;

use anyhow::Context as _;
use mavlog::io::TypeFilter;
use mavlog::DecoderConfig;

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Load the decoder configuration, or the default when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<DecoderConfig> {
    match path {
        Some(path) => DecoderConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(DecoderConfig::default()),
    }
}

/// Build a type filter from command-line selections.
///
/// A regex takes precedence over an include list, which takes precedence
/// over an exclude list.
pub fn build_filter(
    types: &[String],
    exclude: &[String],
    regex: Option<&str>,
) -> Result<TypeFilter> {
    if let Some(pattern) = regex {
        return TypeFilter::regex_include(pattern)
            .with_context(|| format!("invalid type pattern '{pattern}'"));
    }
    if !types.is_empty() {
        return Ok(TypeFilter::include(types.iter().cloned()));
    }
    if !exclude.is_empty() {
        return Ok(TypeFilter::exclude(exclude.iter().cloned()));
    }
    Ok(TypeFilter::All)
}

/// Format a byte count to a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

/// Byte progress bar, drawn only when stderr is a terminal.
pub struct ProgressBar {
    inner: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a progress bar over `total` bytes.
    pub fn new(total: u64, prefix: impl Into<String>) -> Result<Self> {
        let inner = if std::io::stderr().is_terminal() {
            let pb = indicatif::ProgressBar::new(total);
            pb.set_style(
                indicatif::ProgressStyle::default_bar()
                    .template("{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} {msg}")?
                    .progress_chars("=>-"),
            );
            pb.set_prefix(prefix.into());
            Some(pb)
        } else {
            None
        };

        Ok(Self { inner })
    }

    /// Move to an absolute byte position.
    pub fn set_position(&self, pos: u64) {
        if let Some(pb) = &self.inner {
            pb.set_position(pos);
        }
    }

    /// Finish the progress bar with a message.
    pub fn finish_with_message(&self, msg: String) {
        if let Some(pb) = &self.inner {
            pb.finish_with_message(msg);
        }
    }
}
