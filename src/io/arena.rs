// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Memory-mapped log storage.
//!
//! A log is mapped once and shared by every reader that scans it. The mapping
//! is released when the last [`LogBytes`] handle is dropped.
//!
//! # Ownership Model
//!
//! ```text
//! Arc<LogBytes> (owns mmap or buffer)
//!   ↓
//! SequentialReader / ParallelReader (share the Arc)
//!   ↓
//! chunk workers (borrow &[u8] for the scope of a parallel run)
//! ```

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use crate::CodecError;

/// A memory-mapped file that owns its mapping.
///
/// # Safety
///
/// The mapping is only handed out as slices tied to the arena's lifetime.
/// The file must not be truncated by another process while it is mapped.
pub struct MmapArena {
    mmap: memmap2::Mmap,
    path: String,
}

impl MmapArena {
    /// Open and map a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let file = File::open(path_ref).map_err(|e| {
            CodecError::io("MmapArena", format!("Failed to open file '{path_str}': {e}"))
        })?;

        // The mapping is owned by the arena and never outlives it.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| {
            CodecError::io("MmapArena", format!("Failed to mmap file '{path_str}': {e}"))
        })?;

        Ok(Self {
            mmap,
            path: path_str,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get a reference to the memory-mapped data.
    pub fn data(&self) -> &[u8] {
        &self.mmap
    }

    /// Get the length of the data.
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Check if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

impl Deref for MmapArena {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.mmap
    }
}

impl std::fmt::Debug for MmapArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapArena")
            .field("path", &self.path)
            .field("len", &self.mmap.len())
            .finish()
    }
}

/// Bytes of a log, mapped from a file or held in memory.
#[derive(Debug)]
pub enum LogBytes {
    /// Memory-mapped file
    Mapped(MmapArena),
    /// In-memory buffer
    Owned {
        /// Log contents
        data: Vec<u8>,
        /// Source path, if the bytes came from a file
        path: Option<String>,
    },
}

impl LogBytes {
    /// Map a log file. Empty files are not mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        let path_ref = path.as_ref();
        let len = std::fs::metadata(path_ref)
            .map_err(|e| {
                CodecError::io(
                    "LogBytes",
                    format!("Failed to stat '{}': {e}", path_ref.display()),
                )
            })?
            .len();

        if len == 0 {
            return Ok(LogBytes::Owned {
                data: Vec::new(),
                path: Some(path_ref.to_string_lossy().to_string()),
            });
        }
        MmapArena::open(path_ref).map(LogBytes::Mapped)
    }

    /// Wrap an in-memory log.
    pub fn from_vec(data: Vec<u8>) -> Self {
        LogBytes::Owned { data, path: None }
    }

    /// Source path, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            LogBytes::Mapped(arena) => Some(arena.path()),
            LogBytes::Owned { path, .. } => path.as_deref(),
        }
    }

    /// The log contents.
    pub fn data(&self) -> &[u8] {
        match self {
            LogBytes::Mapped(arena) => arena.data(),
            LogBytes::Owned { data, .. } => data,
        }
    }
}

impl Deref for LogBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.data()
    }
}
