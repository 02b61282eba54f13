// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Info command - log size, schemas and per-type record counts.

use std::path::PathBuf;

use clap::Args;
use mavlog::{DecoderConfig, MavReader};

use crate::common::{format_bytes, Result};

/// Show basic log information.
#[derive(Args, Clone, Debug)]
pub struct InfoCmd {
    /// Input log file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

impl InfoCmd {
    pub fn run(self, config: DecoderConfig) -> Result<()> {
        let reader = MavReader::open_with_config(&self.input, config)?;
        let info = reader.summarize()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
            return Ok(());
        }

        println!("=== {} ===", self.input.display());
        println!("Size: {} ({} bytes)", format_bytes(info.size), info.size);
        println!("Strategy: {}", reader.strategy());
        println!("Schema records: {}", info.schema_records);
        println!("Data records: {}", info.data_records);
        println!("Unframed bytes: {}", info.unframed_bytes);

        println!();
        println!("Types ({}):", info.types.len());
        for t in &info.types {
            println!(
                "  [{:3}] {:<8} | {:<16} | {:3} bytes | {} records",
                t.type_id, t.name, t.format, t.record_len, t.records
            );
        }

        Ok(())
    }
}
