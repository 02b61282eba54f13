// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # mavlog
//!
//! Decoder for self-describing binary telemetry logs (ArduPilot DataFlash
//! `.bin` format).
//!
//! A log is a flat sequence of records. Each record opens with a two byte
//! sync marker and a type byte; schema (FMT) records embedded in the stream
//! declare the layout of every other record type. Decoded messages are
//! ordered field maps whose first field, `mavpackettype`, carries the schema
//! name.
//!
//! ## Architecture
//!
//! - `core/` - error and value types
//! - `config` - framing constants, format-code table, scaling and rounding
//! - `schema/` - schema records, the format table and compiled field plans
//! - `encoding/` - plan-driven payload decoding
//! - `io/` - record framing, chunk planning, sequential and parallel readers
//!
//! ## Example: Reading a log
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mavlog::io::SequentialReader;
//!
//! let reader = SequentialReader::open("flight.bin")?;
//! for msg in reader {
//!     if msg.msg_type() == "GPS" {
//!         println!("{msg}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Parallel decode
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mavlog::io::{ParallelReader, ReadOptions};
//!
//! let reader = ParallelReader::open("flight.bin")?;
//! let (messages, stats) = reader.parse_all_with_stats(&ReadOptions::default().with_threads(8))?;
//! println!("{} messages, {stats}", messages.len());
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{CodecError, CodecValue, DecodedMessage, PrimitiveType, Result, MSG_TYPE_FIELD};

// Decoder configuration
pub mod config;

pub use config::{DecoderConfig, FormatKind};

// Schema records, format table and field plans
pub mod schema;

pub use schema::{FieldPlan, FormatTable, MessageSchema, SchemaRecord};

// Payload decoding
pub mod encoding;

pub use encoding::MessageDecoder;

// I/O types (framing, chunking, readers)
pub mod io;

pub use io::{
    MavReader, ParallelReader, ParseStats, ReadOptions, ReadStrategy, SequentialReader,
    TypeFilter,
};
