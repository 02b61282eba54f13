// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record framing.
//!
//! A [`RecordScanner`] walks a byte range and yields one [`Frame`] per
//! recognized record. It never decodes anything: a frame is just the offset,
//! length and kind of a record. The same scanner drives the sequential
//! reader, the schema pre-scan and every parallel chunk worker, so all of
//! them agree on where records start.
//!
//! Scanning rules, applied at the current offset:
//!
//! 1. Find the next sync marker. Without one, the range is exhausted.
//! 2. Schema record type: frame it with the configured schema length.
//! 3. Known type (schema declared earlier in the log): frame it with the
//!    schema's declared length.
//! 4. Anything else: advance one byte and search again.
//!
//! A record that would extend past the end of the range exhausts the range.

use tracing::{debug, trace, warn};

use crate::config::DecoderConfig;
use crate::encoding::MessageDecoder;
use crate::io::filter::TypeFilter;
use crate::schema::{FormatTable, SchemaRecord, HEADER_LEN};
use crate::DecodedMessage;

/// Binary framing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Two bytes that open every record
    pub sync_marker: [u8; 2],
    /// Type id reserved for schema records
    pub schema_type: u8,
    /// Total length of a schema record
    pub schema_length: usize,
}

impl From<&DecoderConfig> for FrameLayout {
    fn from(config: &DecoderConfig) -> Self {
        Self {
            sync_marker: config.sync_marker,
            schema_type: config.schema_type,
            schema_length: config.schema_length,
        }
    }
}

impl FrameLayout {
    /// Length of the record starting at `offset`, if one can start there.
    ///
    /// A record can start where the sync marker is followed by the schema
    /// type or by a type whose schema is visible at `offset`, and the record
    /// fits before `end`.
    pub fn record_len_at(&self, data: &[u8], offset: usize, end: usize, table: &FormatTable) -> Option<usize> {
        let end = end.min(data.len());
        if offset + HEADER_LEN > end || data[offset..offset + 2] != self.sync_marker {
            return None;
        }
        let len = self.type_len(data[offset + 2], offset, table)?;
        (offset + len <= end).then_some(len)
    }

    fn type_len(&self, type_id: u8, offset: usize, table: &FormatTable) -> Option<usize> {
        if type_id == self.schema_type {
            Some(self.schema_length)
        } else {
            table.visible_at(type_id, offset as u64).map(|s| s.record_len())
        }
    }
}

/// Kind of a framed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Schema (FMT) record
    Schema,
    /// Data record of a registered type
    Data {
        /// Message type id
        type_id: u8,
    },
}

/// One recognized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Offset of the sync marker
    pub offset: usize,
    /// Total record length, header included
    pub length: usize,
    /// Record kind
    pub kind: FrameKind,
}

impl Frame {
    /// The whole record, header included.
    pub fn bytes<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.offset..self.offset + self.length]
    }

    /// The record payload after the 3-byte header.
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.offset + HEADER_LEN..self.offset + self.length]
    }

    /// Offset just past the record.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Cursor over a byte range of a log.
#[derive(Debug, Clone)]
pub struct RecordScanner {
    layout: FrameLayout,
    offset: usize,
    end: usize,
}

impl RecordScanner {
    /// Create a scanner over `[start, end)`.
    pub fn new(layout: FrameLayout, start: usize, end: usize) -> Self {
        Self {
            layout,
            offset: start,
            end,
        }
    }

    /// Current scan offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// End of the scanned range.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Check if the range has been fully consumed.
    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.end
    }

    /// Frame the next record.
    ///
    /// Returns `None` once the range is exhausted; every later call also
    /// returns `None`.
    pub fn next_frame(&mut self, data: &[u8], table: &FormatTable) -> Option<Frame> {
        let end = self.end.min(data.len());

        while let Some(pos) = find_marker(data, self.offset, end, self.layout.sync_marker) {
            if pos + HEADER_LEN > end {
                break;
            }

            let type_id = data[pos + 2];
            let kind = if type_id == self.layout.schema_type {
                FrameKind::Schema
            } else {
                FrameKind::Data { type_id }
            };

            match self.layout.type_len(type_id, pos, table) {
                Some(length) if pos + length <= end => {
                    self.offset = pos + length;
                    return Some(Frame {
                        offset: pos,
                        length,
                        kind,
                    });
                }
                Some(length) => {
                    trace!(offset = pos, length, end, "Record extends past range end");
                    break;
                }
                None => self.offset = pos + 1,
            }
        }

        self.offset = self.end;
        None
    }

    /// Continue scanning one byte after a frame that turned out to be bogus.
    pub fn resync_after(&mut self, frame: &Frame) {
        self.offset = frame.offset + 1;
    }
}

/// Position of the next sync marker in `data[from..end)`.
///
/// Only positions whose second marker byte lies before `end` are reported.
pub fn find_marker(data: &[u8], from: usize, end: usize, marker: [u8; 2]) -> Option<usize> {
    let end = end.min(data.len());
    if from + 1 >= end {
        return None;
    }

    let mut pos = from;
    while let Some(hit) = data[pos..end - 1].iter().position(|&b| b == marker[0]) {
        let candidate = pos + hit;
        if data[candidate + 1] == marker[1] {
            return Some(candidate);
        }
        pos = candidate + 1;
    }
    None
}

/// Result of processing one frame.
#[derive(Debug)]
pub enum FrameOutcome {
    /// A decoded data message that passed the filter
    Message(DecodedMessage),
    /// A parsed schema record
    Schema(SchemaRecord),
    /// A data record that was filtered out or failed to decode
    Skipped,
    /// A schema record that could not be parsed or declares an unusable
    /// length; rescan from `offset + 1`
    Resync,
}

/// Turn a frame into a message or schema record.
///
/// Shared by every scanning mode so that decoding, filtering and error
/// handling stay identical across them.
pub fn process_frame(
    data: &[u8],
    frame: &Frame,
    table: &FormatTable,
    filter: &TypeFilter,
    decoder: &MessageDecoder,
) -> FrameOutcome {
    match frame.kind {
        FrameKind::Schema => match SchemaRecord::parse(frame.bytes(data)) {
            Ok(record) if record.record_len() >= HEADER_LEN => FrameOutcome::Schema(record),
            Ok(record) => {
                debug!(
                    offset = frame.offset,
                    name = %record.name,
                    length = record.length,
                    "Schema declares a record shorter than its header"
                );
                FrameOutcome::Resync
            }
            Err(e) => {
                debug!(offset = frame.offset, error = %e, "Unreadable schema record");
                FrameOutcome::Resync
            }
        },
        FrameKind::Data { type_id } => {
            let Some(schema) = table.get(type_id) else {
                return FrameOutcome::Skipped;
            };
            if !filter.should_include(schema.name()) {
                return FrameOutcome::Skipped;
            }
            match decoder.decode(schema, frame.payload(data)) {
                Ok(msg) => FrameOutcome::Message(msg),
                Err(e) if e.is_record_level() => {
                    trace!(
                        offset = frame.offset,
                        name = schema.name(),
                        error = %e,
                        "Skipping undecodable record"
                    );
                    FrameOutcome::Skipped
                }
                Err(e) => {
                    warn!(offset = frame.offset, name = schema.name(), error = %e, "Record decode failed");
                    FrameOutcome::Skipped
                }
            }
        }
    }
}
