// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema (FMT) record parsing.
//!
//! # Layout
//!
//! ```text
//! offset  size  field
//! 0       2     sync marker
//! 2       1     record type (schema type id)
//! 3       1     declared type id
//! 4       1     declared total record length (header included)
//! 5       4     name, zero padded
//! 9       16    format codes, zero padded
//! 25      64    comma separated column names, zero padded
//! ```

use crate::core::{CodecValue, DecodedMessage};
use crate::{CodecError, Result};

/// Sync marker plus type byte.
pub const HEADER_LEN: usize = 3;

const NAME_LEN: usize = 4;
const FORMAT_LEN: usize = 16;
const COLUMNS_LEN: usize = 64;

/// Bytes a schema record needs to be unpacked.
pub const SCHEMA_LAYOUT_SIZE: usize = HEADER_LEN + 2 + NAME_LEN + FORMAT_LEN + COLUMNS_LEN;

/// Message type name used for schema acknowledgement messages.
pub const SCHEMA_MSG_NAME: &str = "FMT";

/// Parsed contents of one schema record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRecord {
    /// Declared message type id
    pub type_id: u8,
    /// Declared total record length, header included
    pub length: u8,
    /// Schema name, e.g. "GPS"
    pub name: String,
    /// One format code per field
    pub format: String,
    /// Column names in declared order
    pub columns: Vec<String>,
}

impl SchemaRecord {
    /// Parse a schema record starting at its sync marker.
    ///
    /// Text fields are trimmed of trailing zero padding and decoded as ASCII;
    /// non-ASCII bytes are dropped. Fails only when the slice is too short to
    /// hold the fixed layout.
    pub fn parse(record: &[u8]) -> Result<Self> {
        if record.len() < SCHEMA_LAYOUT_SIZE {
            return Err(CodecError::buffer_too_short(
                SCHEMA_LAYOUT_SIZE,
                record.len(),
                0,
            ));
        }

        let body = &record[HEADER_LEN..SCHEMA_LAYOUT_SIZE];
        let type_id = body[0];
        let length = body[1];
        let (name, rest) = body[2..].split_at(NAME_LEN);
        let (format, columns) = rest.split_at(FORMAT_LEN);

        let columns = ascii_text(trim_trailing_zeros(columns))
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            type_id,
            length,
            name: ascii_text(trim_trailing_zeros(name)),
            format: ascii_text(trim_trailing_zeros(format)),
            columns,
        })
    }

    /// Declared record length as a byte count.
    pub fn record_len(&self) -> usize {
        self.length as usize
    }

    /// The acknowledgement message emitted for this schema record.
    pub fn to_message(&self) -> DecodedMessage {
        let mut msg = DecodedMessage::with_capacity(SCHEMA_MSG_NAME, 5);
        msg.push("Type", CodecValue::UInt8(self.type_id));
        msg.push("Length", CodecValue::UInt8(self.length));
        msg.push("Name", CodecValue::String(self.name.clone()));
        msg.push("Format", CodecValue::String(self.format.clone()));
        msg.push("Columns", CodecValue::String(self.columns.join(",")));
        msg
    }
}

/// Strip zero padding from the end of a fixed-width field.
pub(crate) fn trim_trailing_zeros(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    &bytes[..end]
}

/// Cut a character buffer at its first zero byte.
pub(crate) fn until_first_zero(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(p) => &bytes[..p],
        None => bytes,
    }
}

/// Decode bytes as ASCII, dropping anything outside the ASCII range.
pub(crate) fn ascii_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect()
}
