// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Splitting a log into independently decodable chunks.
//!
//! Chunks are contiguous byte ranges that start on record boundaries. A
//! boundary is found by searching forward from an evenly spaced target offset
//! for a sync marker that opens a known record, and confirming it by checking
//! that the records after it chain up as well. Chunk boundaries therefore
//! never split a record, and every record belongs to exactly one chunk.

use std::ops::Range;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::DecoderConfig;
use crate::io::scanner::{find_marker, FrameKind, FrameLayout, RecordScanner};
use crate::schema::{FormatTable, HEADER_LEN};

/// Records that must follow a candidate boundary for it to be accepted.
const CUT_CONFIRMATIONS: usize = 2;

/// A contiguous byte range decoded by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Position in log order
    pub index: usize,
    /// First byte (inclusive)
    pub start: usize,
    /// Last byte (exclusive)
    pub end: usize,
}

impl Chunk {
    /// Chunk size in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the chunk covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The byte range of the chunk.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Build a format table from the schema records in the head of a log.
///
/// Scans `[0, min(len, head_scan_limit))` with the regular record scanner,
/// registering schema records and stepping over data records by length.
pub fn prescan_schemas(data: &[u8], config: &DecoderConfig) -> FormatTable {
    let limit = data.len().min(config.head_scan_limit);
    let mut table = FormatTable::new();
    let mut scanner = RecordScanner::new(FrameLayout::from(config), 0, limit);

    while let Some(frame) = scanner.next_frame(data, &table) {
        if frame.kind != FrameKind::Schema {
            continue;
        }
        if let Err(e) = table.register(frame.bytes(data), frame.offset as u64, config) {
            debug!(offset = frame.offset, error = %e, "Rejected schema record in pre-scan");
            scanner.resync_after(&frame);
        }
    }

    info!(
        schemas = table.len(),
        scanned = limit,
        "Schema pre-scan complete"
    );
    table
}

/// Number of workers to use.
///
/// An explicit request is capped at `max_workers`; otherwise the CPU count
/// is used, capped the same way.
pub fn resolve_worker_count(requested: Option<usize>, max_workers: usize) -> usize {
    let workers = requested.unwrap_or_else(num_cpus::get);
    workers.clamp(1, max_workers.max(1))
}

/// Plans record-aligned chunk boundaries.
pub struct ChunkPlanner<'a> {
    data: &'a [u8],
    table: &'a FormatTable,
    layout: FrameLayout,
}

impl<'a> ChunkPlanner<'a> {
    /// Create a planner over a whole log.
    pub fn new(data: &'a [u8], table: &'a FormatTable, config: &DecoderConfig) -> Self {
        Self {
            data,
            table,
            layout: FrameLayout::from(config),
        }
    }

    /// Split the log into at most `workers` chunks.
    ///
    /// Chunks are ordered, contiguous, non-empty and cover the whole log. A
    /// boundary that cannot be found ends the plan early; the last chunk then
    /// extends to the end of the log. An empty log yields a single empty
    /// chunk.
    pub fn plan(&self, workers: usize) -> Vec<Chunk> {
        let size = self.data.len();
        let workers = workers.max(1);
        let target_size = size / workers;

        let mut chunks = Vec::with_capacity(workers);
        let mut chunk_start = 0usize;

        for i in 1..workers {
            let target = (target_size * i).max(chunk_start + 1);
            if target >= size {
                break;
            }
            match self.find_cut(target) {
                Some(cut) => {
                    chunks.push(Chunk {
                        index: chunks.len(),
                        start: chunk_start,
                        end: cut,
                    });
                    chunk_start = cut;
                }
                None => {
                    debug!(target, "No record boundary after target, ending plan");
                    break;
                }
            }
        }

        chunks.push(Chunk {
            index: chunks.len(),
            start: chunk_start,
            end: size,
        });

        debug!(chunks = chunks.len(), size, workers, "Planned chunks");
        chunks
    }

    /// Check if a record can start at `offset`.
    pub fn is_record_start(&self, offset: usize) -> bool {
        self.layout
            .record_len_at(self.data, offset, self.data.len(), self.table)
            .is_some()
    }

    /// First confirmed record boundary at or after `from`.
    fn find_cut(&self, from: usize) -> Option<usize> {
        let size = self.data.len();
        let mut pos = from;
        while let Some(candidate) = find_marker(self.data, pos, size, self.layout.sync_marker) {
            if self.confirm_cut(candidate) {
                return Some(candidate);
            }
            pos = candidate + 1;
        }
        None
    }

    /// Follow the record chain from `offset`.
    ///
    /// Accepted when the first record and the next [`CUT_CONFIRMATIONS`]
    /// records are valid, or when the chain reaches the end of the log.
    fn confirm_cut(&self, offset: usize) -> bool {
        let size = self.data.len();
        let mut pos = offset;
        for _ in 0..=CUT_CONFIRMATIONS {
            if pos + HEADER_LEN > size && pos > offset {
                return true;
            }
            match self
                .layout
                .record_len_at(self.data, pos, size, self.table)
            {
                Some(len) => pos += len,
                None => return false,
            }
        }
        true
    }
}
