// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Summary types for decoded logs.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::schema::MessageSchema;

/// Statistics of one full decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseStats {
    /// Messages emitted, schema acknowledgements included
    pub messages: u64,
    /// Chunks decoded (1 for sequential decodes)
    pub chunks: usize,
    /// Log size in bytes
    pub bytes: u64,
    /// Wall-clock time of the decode
    pub elapsed: Duration,
}

impl ParseStats {
    /// Messages per second, 0 when no time elapsed.
    pub fn messages_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.messages as f64 / secs
        } else {
            0.0
        }
    }

    /// Throughput in MB/s, 0 when no time elapsed.
    pub fn throughput_mb_s(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / (1024.0 * 1024.0) / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for ParseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} messages from {} chunk(s) in {:.3}s ({:.0} msg/s, {:.2} MB/s)",
            self.messages,
            self.chunks,
            self.elapsed.as_secs_f64(),
            self.messages_per_sec(),
            self.throughput_mb_s()
        )
    }
}

/// Per-type record count of a log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    /// Message type id
    pub type_id: u8,
    /// Schema name
    pub name: String,
    /// Format codes
    pub format: String,
    /// Column names
    pub columns: Vec<String>,
    /// Declared record length
    pub record_len: usize,
    /// Offset of the declaring schema record
    pub declared_at: u64,
    /// Data records framed for this type
    pub records: u64,
}

impl TypeSummary {
    /// Summary of a schema with a record count.
    pub fn new(schema: &MessageSchema, records: u64) -> Self {
        let record = schema.record();
        Self {
            type_id: schema.type_id(),
            name: record.name.clone(),
            format: record.format.clone(),
            columns: record.columns.clone(),
            record_len: schema.record_len(),
            declared_at: schema.declared_at(),
            records,
        }
    }
}

/// Structural summary of a log, gathered without decoding payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogInfo {
    /// Source path, if any
    pub path: Option<String>,
    /// Log size in bytes
    pub size: u64,
    /// Schema records framed, duplicates included
    pub schema_records: u64,
    /// Data records framed
    pub data_records: u64,
    /// Bytes not covered by any framed record
    pub unframed_bytes: u64,
    /// Registered types in type id order
    pub types: Vec<TypeSummary>,
}

impl LogInfo {
    /// Look up a type summary by schema name.
    pub fn type_by_name(&self, name: &str) -> Option<&TypeSummary> {
        self.types.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats_rates() {
        let stats = ParseStats {
            messages: 1000,
            chunks: 4,
            bytes: 2 * 1024 * 1024,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(stats.messages_per_sec(), 500.0);
        assert_eq!(stats.throughput_mb_s(), 1.0);
        assert_eq!(
            stats.to_string(),
            "1000 messages from 4 chunk(s) in 2.000s (500 msg/s, 1.00 MB/s)"
        );
    }

    #[test]
    fn test_parse_stats_zero_elapsed() {
        let stats = ParseStats::default();
        assert_eq!(stats.messages_per_sec(), 0.0);
        assert_eq!(stats.throughput_mb_s(), 0.0);
    }
}
