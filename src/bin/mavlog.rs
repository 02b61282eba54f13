// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # mavlog CLI
//!
//! Command-line tool for binary telemetry logs.
//!
//! ## Usage
//!
//! ```sh
//! # Show log structure and per-type record counts
//! mavlog info flight.bin
//!
//! # List schemas and their compiled field plans
//! mavlog schemas flight.bin --plans
//!
//! # Decode GPS and attitude messages as JSON lines
//! mavlog decode flight.bin --type GPS,ATT --json
//!
//! # Decode in parallel and report throughput
//! mavlog decode flight.bin --strategy parallel --threads 8 --stats
//!
//! # Show how a log would be split between workers
//! mavlog chunks flight.bin --threads 4
//! ```

mod cmd;
mod common;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use cmd::{ChunksCmd, DecodeCmd, InfoCmd, SchemasCmd};
use common::{init_logging, LogFormat, LogLevel, Result};

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// mavlog - binary telemetry log decoder
///
/// Decodes self-describing DataFlash logs, sequentially or in parallel.
#[derive(Parser, Clone)]
#[command(name = "mavlog")]
#[command(about = "Decoder for self-describing binary telemetry logs", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Decoder configuration file (.toml or .json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log verbosity on stderr
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Show log size, schema count and per-type record counts
    Info(InfoCmd),

    /// List the schemas declared in a log
    Schemas(SchemasCmd),

    /// Decode messages as text or JSON lines
    Decode(DecodeCmd),

    /// Show the record-aligned chunk plan used for parallel decoding
    Chunks(ChunksCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let config = common::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info(cmd) => cmd.run(config),
        Commands::Schemas(cmd) => cmd.run(config),
        Commands::Decode(cmd) => cmd.run(config),
        Commands::Chunks(cmd) => cmd.run(config),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
