// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Chunks command - show the record-aligned split used by parallel decoding.

use std::path::PathBuf;

use clap::Args;
use mavlog::{DecoderConfig, MavReader};

use crate::common::{format_bytes, Result};

/// Show the chunk plan for a log.
#[derive(Args, Clone, Debug)]
pub struct ChunksCmd {
    /// Input log file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Requested worker count (defaults to the number of CPUs)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl ChunksCmd {
    pub fn run(self, config: DecoderConfig) -> Result<()> {
        let reader = MavReader::open_with_config(&self.input, config)?.parallel()?;
        let workers = reader.worker_count(self.threads);
        let chunks = reader.plan_chunks(workers);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&chunks)?);
            return Ok(());
        }

        println!("=== {} ===", self.input.display());
        println!("Size: {}", format_bytes(reader.file_size() as u64));
        println!("Schemas from pre-scan: {}", reader.schemas().len());
        println!("Workers: {workers}");
        println!("Chunks: {}", chunks.len());
        println!();
        for chunk in &chunks {
            println!(
                "  [{:2}] {:>12} .. {:<12} ({})",
                chunk.index,
                chunk.start,
                chunk.end,
                format_bytes(chunk.len() as u64)
            );
        }

        Ok(())
    }
}
