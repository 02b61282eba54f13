// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Parallel log reader.
//!
//! The log is mapped once, its schemas are collected by a pre-scan of the
//! head of the file, and the frozen format table is shared read-only by a
//! pool of workers. Each worker decodes one record-aligned chunk and sends
//! its messages back tagged with the chunk index; the coordinator orders the
//! results by index, so the output matches a sequential read.
//!
//! Schemas declared after the pre-scan limit are acknowledged but not used
//! for decoding in this mode.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::DecoderConfig;
use crate::encoding::MessageDecoder;
use crate::io::arena::LogBytes;
use crate::io::cancel::CancelToken;
use crate::io::chunking::{prescan_schemas, resolve_worker_count, Chunk, ChunkPlanner};
use crate::io::filter::TypeFilter;
use crate::io::metadata::ParseStats;
use crate::io::scanner::{process_frame, FrameLayout, FrameOutcome, RecordScanner};
use crate::io::traits::ReadOptions;
use crate::schema::FormatTable;
use crate::{CodecError, DecodedMessage, Result};

/// Messages decoded from one chunk.
#[derive(Debug)]
pub struct ChunkOutput {
    /// Index of the chunk in log order
    pub index: usize,
    /// Messages in record order
    pub messages: Vec<DecodedMessage>,
}

/// Decode every record of one chunk against a frozen table.
///
/// Schema records inside the chunk are acknowledged (when the filter allows
/// it) but never registered.
pub fn decode_chunk(
    data: &[u8],
    chunk: &Chunk,
    table: &FormatTable,
    layout: FrameLayout,
    filter: &TypeFilter,
    cancel: Option<&CancelToken>,
) -> ChunkOutput {
    let decoder = MessageDecoder::new();
    let mut scanner = RecordScanner::new(layout, chunk.start, chunk.end);
    let mut messages = Vec::new();

    while let Some(frame) = scanner.next_frame(data, table) {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            debug!(chunk = chunk.index, offset = frame.offset, "Chunk decode cancelled");
            break;
        }
        match process_frame(data, &frame, table, filter, &decoder) {
            FrameOutcome::Message(msg) => messages.push(msg),
            FrameOutcome::Schema(record) => {
                if filter.includes_schema_messages() {
                    messages.push(record.to_message());
                }
            }
            FrameOutcome::Skipped => {}
            FrameOutcome::Resync => scanner.resync_after(&frame),
        }
    }

    ChunkOutput {
        index: chunk.index,
        messages,
    }
}

/// Runs chunk workers and merges their output in chunk order.
pub struct ParallelCoordinator<'a> {
    data: &'a [u8],
    table: &'a FormatTable,
    layout: FrameLayout,
}

impl<'a> ParallelCoordinator<'a> {
    /// Create a coordinator over a log and its frozen format table.
    pub fn new(data: &'a [u8], table: &'a FormatTable, config: &DecoderConfig) -> Self {
        Self {
            data,
            table,
            layout: FrameLayout::from(config),
        }
    }

    /// Decode `chunks` with one pool thread per chunk.
    pub fn run(
        &self,
        chunks: &[Chunk],
        filter: &TypeFilter,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<DecodedMessage>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(chunks.len().max(1))
            .thread_name(|index| format!("mavlog-worker-{index}"))
            .build()
            .map_err(|e| CodecError::worker(format!("thread pool: {e}")))?;

        let (sender, receiver) = crossbeam_channel::unbounded::<ChunkOutput>();
        let (data, table, layout) = (self.data, self.table, self.layout);

        pool.scope(|scope| {
            for chunk in chunks {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    let output = decode_chunk(data, chunk, table, layout, filter, cancel);
                    debug!(
                        chunk = chunk.index,
                        start = chunk.start,
                        end = chunk.end,
                        messages = output.messages.len(),
                        "Chunk decoded"
                    );
                    if sender.send(output).is_err() {
                        warn!(chunk = chunk.index, "Result channel closed early");
                    }
                });
            }
        });
        drop(sender);

        let mut outputs: Vec<ChunkOutput> = receiver.iter().collect();
        if outputs.len() != chunks.len() {
            return Err(CodecError::worker(format!(
                "expected {} chunk results, received {}",
                chunks.len(),
                outputs.len()
            )));
        }
        outputs.sort_by_key(|o| o.index);

        let total = outputs.iter().map(|o| o.messages.len()).sum();
        let mut messages = Vec::with_capacity(total);
        for output in outputs {
            messages.extend(output.messages);
        }
        Ok(messages)
    }
}

/// Whole-log reader that decodes chunks concurrently.
pub struct ParallelReader {
    source: Arc<LogBytes>,
    config: Arc<DecoderConfig>,
    table: Arc<FormatTable>,
}

impl ParallelReader {
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

    /// Read a shared log. Runs the schema pre-scan.
    pub fn from_source(source: Arc<LogBytes>, config: Arc<DecoderConfig>) -> Result<Self> {
        config.validate()?;
        let table = prescan_schemas(source.data(), &config);
        Ok(Self {
            source,
            config,
            table: Arc::new(table),
        })
    }

    /// The frozen format table.
    pub fn schemas(&self) -> &FormatTable {
        &self.table
    }

    /// Log size in bytes.
    pub fn file_size(&self) -> usize {
        self.source.len()
    }

    /// Source path, if the log came from a file.
    pub fn path(&self) -> Option<&str> {
        self.source.path()
    }

    /// Worker count for a requested thread count.
    pub fn worker_count(&self, requested: Option<usize>) -> usize {
        resolve_worker_count(requested, self.config.max_workers)
    }

    /// Plan record-aligned chunks for `workers` workers.
    pub fn plan_chunks(&self, workers: usize) -> Vec<Chunk> {
        ChunkPlanner::new(self.source.data(), &self.table, &self.config).plan(workers)
    }

    /// Decode a set of planned chunks in parallel.
    pub fn decode_chunks(
        &self,
        chunks: &[Chunk],
        filter: &TypeFilter,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<DecodedMessage>> {
        ParallelCoordinator::new(self.source.data(), &self.table, &self.config)
            .run(chunks, filter, cancel)
    }

    /// Decode the whole log with default options.
    pub fn parse_all(&self, filter: &TypeFilter) -> Result<Vec<DecodedMessage>> {
        let options = ReadOptions::default().with_filter(filter.clone());
        self.parse_all_with_stats(&options).map(|(messages, _)| messages)
    }

    /// Decode the whole log and report statistics.
    pub fn parse_all_with_stats(
        &self,
        options: &ReadOptions,
    ) -> Result<(Vec<DecodedMessage>, ParseStats)> {
        let start = Instant::now();
        let workers = self.worker_count(options.num_threads);
        let chunks = self.plan_chunks(workers);

        info!(
            path = self.path().unwrap_or("<memory>"),
            workers,
            chunks = chunks.len(),
            schemas = self.table.len(),
            "Starting parallel decode"
        );

        let messages = self.decode_chunks(&chunks, &options.filter, options.cancel.as_ref())?;
        let stats = ParseStats {
            messages: messages.len() as u64,
            chunks: chunks.len(),
            bytes: self.file_size() as u64,
            elapsed: start.elapsed(),
        };
        info!(%stats, "Parallel decode complete");
        Ok((messages, stats))
    }

    /// Release the log.
    pub fn close(self) {
        debug!(path = self.path().unwrap_or("<memory>"), "Closed parallel reader");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sequential::SequentialReader;
    use crate::schema::record::tests::schema_bytes;

    fn sample_log(records: u16) -> Vec<u8> {
        let mut log = schema_bytes(1, 7, "CNT", "Hh", "N,V");
        log.extend(schema_bytes(2, 4, "FLAG", "B", "On"));
        for n in 0..records {
            log.extend_from_slice(&[0xA3, 0x95, 1]);
            log.extend_from_slice(&n.to_le_bytes());
            log.extend_from_slice(&(-(n as i16)).to_le_bytes());
            if n % 5 == 0 {
                log.extend_from_slice(&[0xA3, 0x95, 2, (n % 2) as u8]);
            }
        }
        log
    }

    #[test]
    fn test_matches_sequential() {
        let log = sample_log(500);
        let config = DecoderConfig::default();
        let sequential = SequentialReader::from_bytes(log.clone(), config.clone())
            .unwrap()
            .parse_all();

        let reader = ParallelReader::from_bytes(log, config).unwrap();
        for workers in [1, 2, 3, 7, 16] {
            let chunks = reader.plan_chunks(workers);
            let parallel = reader.decode_chunks(&chunks, &TypeFilter::All, None).unwrap();
            assert_eq!(parallel, sequential, "workers = {workers}");
        }
    }

    #[test]
    fn test_filter_applies_per_chunk() {
        let log = sample_log(100);
        let reader = ParallelReader::from_bytes(log, DecoderConfig::default()).unwrap();
        let msgs = reader.parse_all(&TypeFilter::include(["FLAG"])).unwrap();
        assert_eq!(msgs.len(), 20);
        assert!(msgs.iter().all(|m| m.msg_type() == "FLAG"));
    }

    #[test]
    fn test_stats() {
        let log = sample_log(50);
        let size = log.len() as u64;
        let reader = ParallelReader::from_bytes(log, DecoderConfig::default()).unwrap();
        let (msgs, stats) = reader
            .parse_all_with_stats(&ReadOptions::default().with_threads(2))
            .unwrap();
        assert_eq!(stats.messages, msgs.len() as u64);
        assert_eq!(stats.bytes, size);
        assert!(stats.chunks >= 1 && stats.chunks <= 2);
        // 2 acknowledgements, 50 counters, 10 flags
        assert_eq!(msgs.len(), 62);
    }

    #[test]
    fn test_cancelled_before_start() {
        let log = sample_log(50);
        let reader = ParallelReader::from_bytes(log, DecoderConfig::default()).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let options = ReadOptions::default().with_cancel(token);
        let (msgs, _) = reader.parse_all_with_stats(&options).unwrap();
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_empty_log() {
        let reader = ParallelReader::from_bytes(Vec::new(), DecoderConfig::default()).unwrap();
        assert!(reader.parse_all(&TypeFilter::All).unwrap().is_empty());
        assert!(reader.schemas().is_empty());
    }
}
