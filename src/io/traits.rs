// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Options shared by the whole-log readers.

use crate::io::cancel::CancelToken;
use crate::io::filter::TypeFilter;

/// Options for decoding a whole log.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Number of worker threads (None = CPU count, capped by the config)
    pub num_threads: Option<usize>,
    /// Message type filter
    pub filter: TypeFilter,
    /// Cooperative cancellation
    pub cancel: Option<CancelToken>,
}

impl ReadOptions {
    /// Set the number of worker threads.
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Set the message type filter.
    pub fn with_filter(mut self, filter: TypeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the cancel token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}
