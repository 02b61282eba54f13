// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema discovery for self-describing logs.
//!
//! Every message type in a log is declared by a schema (FMT) record embedded
//! in the stream. This module provides:
//!
//! - [`SchemaRecord`] - the parsed contents of one schema record
//! - [`FieldPlan`] - the compiled, per-schema decode plan
//! - [`FormatTable`] - the type id -> schema lookup shared by all scanners

pub mod plan;
pub mod record;
pub mod table;

pub use plan::{FieldOp, FieldPlan, PlannedField};
pub use record::{SchemaRecord, HEADER_LEN, SCHEMA_LAYOUT_SIZE, SCHEMA_MSG_NAME};
pub use table::{FormatTable, MessageSchema};
