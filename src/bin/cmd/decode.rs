// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode command - print decoded messages as text or JSON lines.

use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use mavlog::io::ParseStats;
use mavlog::{DecodedMessage, DecoderConfig, MavReader, ReadOptions, ReadStrategy};

use crate::common::{build_filter, ProgressBar, Result};

/// Progress is refreshed every this many messages.
const PROGRESS_INTERVAL: u64 = 4096;

/// Decode messages.
#[derive(Args, Clone, Debug)]
pub struct DecodeCmd {
    /// Input log file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Only decode these message types (comma-separated)
    #[arg(short, long = "type", value_name = "TYPES", value_delimiter = ',')]
    types: Vec<String>,

    /// Skip these message types (comma-separated)
    #[arg(short, long, value_name = "TYPES", value_delimiter = ',', conflicts_with = "types")]
    exclude: Vec<String>,

    /// Only decode message types matching this regex
    #[arg(long, value_name = "PATTERN", conflicts_with_all = ["types", "exclude"])]
    regex: Option<String>,

    /// Reading strategy: sequential, parallel or auto
    #[arg(short, long, default_value = "auto")]
    strategy: ReadStrategy,

    /// Shorthand for --strategy parallel
    #[arg(short, long, conflicts_with = "strategy")]
    parallel: bool,

    /// Worker threads for parallel decoding
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Stop after this many messages
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Print decode statistics to stderr
    #[arg(long)]
    stats: bool,

    /// Output JSON lines
    #[arg(long)]
    json: bool,

    /// Disable rounding of the listed float columns
    #[arg(long)]
    no_rounding: bool,
}

impl DecodeCmd {
    pub fn run(self, mut config: DecoderConfig) -> Result<()> {
        if self.no_rounding {
            config.rounding_enabled = false;
        }

        let strategy = if self.parallel {
            ReadStrategy::Parallel
        } else {
            self.strategy
        };
        let reader = MavReader::open_with_config(&self.input, config)?.with_strategy(strategy);

        let filter = build_filter(&self.types, &self.exclude, self.regex.as_deref())?;
        let mut options = ReadOptions::default().with_filter(filter);
        if let Some(threads) = self.threads {
            options = options.with_threads(threads);
        }

        let stdout = std::io::stdout();
        let mut out = BufWriter::new(stdout.lock());

        let stats = if reader.strategy().is_parallel() {
            let (messages, stats) = reader.parse_all(&options)?;
            let limit = self.limit.unwrap_or(messages.len());
            for msg in messages.iter().take(limit) {
                self.write_message(&mut out, msg)?;
            }
            stats
        } else {
            self.decode_sequential(&reader, options, &mut out)?
        };
        out.flush()?;

        if self.stats {
            eprintln!("{stats}");
        }
        Ok(())
    }

    /// Stream messages one by one so `--limit` stops the scan early.
    fn decode_sequential(
        &self,
        reader: &MavReader,
        options: ReadOptions,
        out: &mut impl Write,
    ) -> Result<ParseStats> {
        let start = Instant::now();
        let mut seq = reader.sequential()?.with_filter(options.filter);
        let progress = ProgressBar::new(reader.file_size() as u64, "decode")?;
        let limit = self.limit.unwrap_or(usize::MAX);
        let mut written = 0u64;

        while (written as usize) < limit {
            let Some(msg) = seq.next_message() else {
                break;
            };
            self.write_message(out, &msg)?;
            written += 1;
            if written % PROGRESS_INTERVAL == 0 {
                progress.set_position(seq.offset() as u64);
            }
        }

        progress.set_position(seq.offset() as u64);
        progress.finish_with_message(format!("{written} messages"));

        Ok(ParseStats {
            messages: written,
            chunks: 1,
            bytes: seq.offset() as u64,
            elapsed: start.elapsed(),
        })
    }

    fn write_message(&self, out: &mut impl Write, msg: &DecodedMessage) -> Result<()> {
        if self.json {
            serde_json::to_writer(&mut *out, msg)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{msg}")?;
        }
        Ok(())
    }
}
