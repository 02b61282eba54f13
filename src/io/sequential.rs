// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sequential log reader.
//!
//! Scans the whole log front to back with a single [`RecordScanner`],
//! registering schema records as they are met and decoding data records
//! against the schemas seen so far. This is the reference behavior the
//! parallel reader is checked against.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::DecoderConfig;
use crate::encoding::MessageDecoder;
use crate::io::arena::LogBytes;
use crate::io::cancel::CancelToken;
use crate::io::filter::TypeFilter;
use crate::io::metadata::{LogInfo, TypeSummary};
use crate::io::scanner::{process_frame, FrameKind, FrameLayout, FrameOutcome, RecordScanner};
use crate::schema::{FormatTable, SchemaRecord};
use crate::{DecodedMessage, Result};

/// Front-to-back reader over a whole log.
///
/// Implements [`Iterator`], yielding messages in log order. Records that
/// fail to decode are skipped; the iterator ends when the log is exhausted
/// or the cancel token fires.
pub struct SequentialReader {
    source: Arc<LogBytes>,
    config: Arc<DecoderConfig>,
    table: FormatTable,
    scanner: RecordScanner,
    filter: TypeFilter,
    decoder: MessageDecoder,
    cancel: Option<CancelToken>,
    message_count: u64,
}

impl SequentialReader {
    /// Open a log with the default configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, DecoderConfig::default())
    }

    /// Open a log with an explicit configuration.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: DecoderConfig) -> Result<Self> {
        let source = LogBytes::open(path)?;
        Self::from_source(Arc::new(source), Arc::new(config))
    }

    /// Read an in-memory log.
    pub fn from_bytes(data: Vec<u8>, config: DecoderConfig) -> Result<Self> {
        Self::from_source(Arc::new(LogBytes::from_vec(data)), Arc::new(config))
    }

    /// Read a shared log.
    pub fn from_source(source: Arc<LogBytes>, config: Arc<DecoderConfig>) -> Result<Self> {
        config.validate()?;
        let scanner = RecordScanner::new(FrameLayout::from(config.as_ref()), 0, source.len());
        debug!(
            path = source.path().unwrap_or("<memory>"),
            size = source.len(),
            "Opened log for sequential reading"
        );
        Ok(Self {
            source,
            config,
            table: FormatTable::new(),
            scanner,
            filter: TypeFilter::All,
            decoder: MessageDecoder::new(),
            cancel: None,
            message_count: 0,
        })
    }

    /// Only emit message types accepted by `filter`.
    pub fn with_filter(mut self, filter: TypeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Stop early when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Decode the next message, or `None` at the end of the log.
    pub fn next_message(&mut self) -> Option<DecodedMessage> {
        let data = self.source.data();
        loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                debug!(offset = self.scanner.offset(), "Sequential read cancelled");
                return None;
            }

            let frame = self.scanner.next_frame(data, &self.table)?;
            match process_frame(data, &frame, &self.table, &self.filter, &self.decoder) {
                FrameOutcome::Message(msg) => {
                    self.message_count += 1;
                    return Some(msg);
                }
                FrameOutcome::Schema(record) => {
                    let ack = self
                        .filter
                        .includes_schema_messages()
                        .then(|| record.to_message());
                    match self.table.install(record, frame.offset as u64, &self.config) {
                        Ok(_) => {
                            if let Some(ack) = ack {
                                self.message_count += 1;
                                return Some(ack);
                            }
                        }
                        Err(e) => {
                            debug!(offset = frame.offset, error = %e, "Rejected schema record");
                            self.scanner.resync_after(&frame);
                        }
                    }
                }
                FrameOutcome::Skipped => {}
                FrameOutcome::Resync => self.scanner.resync_after(&frame),
            }
        }
    }

    /// Decode every remaining message.
    pub fn parse_all(&mut self) -> Vec<DecodedMessage> {
        self.by_ref().collect()
    }

    /// Frame the remaining records without decoding payloads.
    pub fn summarize(mut self) -> LogInfo {
        let data = self.source.data();
        let mut counts = [0u64; 256];
        let mut info = LogInfo {
            path: self.source.path().map(str::to_string),
            size: data.len() as u64,
            ..LogInfo::default()
        };
        let mut covered = 0u64;

        while let Some(frame) = self.scanner.next_frame(data, &self.table) {
            match frame.kind {
                FrameKind::Schema => {
                    let installed = SchemaRecord::parse(frame.bytes(data))
                        .and_then(|r| self.table.install(r, frame.offset as u64, &self.config));
                    if installed.is_err() {
                        self.scanner.resync_after(&frame);
                        continue;
                    }
                    info.schema_records += 1;
                }
                FrameKind::Data { type_id } => {
                    counts[type_id as usize] += 1;
                    info.data_records += 1;
                }
            }
            covered += frame.length as u64;
        }

        info.unframed_bytes = info.size.saturating_sub(covered);
        info.types = self
            .table
            .iter()
            .map(|s| TypeSummary::new(s, counts[s.type_id() as usize]))
            .collect();
        info
    }

    /// Schemas registered so far.
    pub fn schemas(&self) -> &FormatTable {
        &self.table
    }

    /// Current scan offset.
    pub fn offset(&self) -> usize {
        self.scanner.offset()
    }

    /// Log size in bytes.
    pub fn file_size(&self) -> usize {
        self.source.len()
    }

    /// Messages emitted so far.
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Source path, if the log came from a file.
    pub fn path(&self) -> Option<&str> {
        self.source.path()
    }

    /// The configuration in use.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Release the log. The mapping is unmapped once no other reader shares it.
    pub fn close(self) {
        debug!(
            messages = self.message_count,
            offset = self.scanner.offset(),
            "Closed sequential reader"
        );
    }
}

impl Iterator for SequentialReader {
    type Item = DecodedMessage;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_message()
    }
}
