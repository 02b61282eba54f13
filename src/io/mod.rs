// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for binary telemetry logs.
//!
//! Record framing, chunk planning and the sequential and parallel readers
//! built on top of them.

pub mod arena;
pub mod cancel;
pub mod chunking;
pub mod filter;
pub mod metadata;
pub mod parallel;
pub mod scanner;
pub mod sequential;

// Options shared by whole-log readers
pub mod traits;

// Unified reader with strategy selection
pub mod reader;

// Re-exports
pub use arena::{LogBytes, MmapArena};
pub use cancel::CancelToken;
pub use chunking::{prescan_schemas, resolve_worker_count, Chunk, ChunkPlanner};
pub use filter::TypeFilter;
pub use metadata::{LogInfo, ParseStats, TypeSummary};
pub use parallel::{decode_chunk, ChunkOutput, ParallelCoordinator, ParallelReader};
pub use reader::{MavReader, ReadStrategy, ReaderBuilder};
pub use scanner::{Frame, FrameKind, FrameLayout, RecordScanner};
pub use sequential::SequentialReader;
pub use traits::ReadOptions;
