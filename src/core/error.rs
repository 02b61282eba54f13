// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for mavlog.
//!
//! Record-level failures (short payloads, malformed schema records, unknown
//! format codes) are reported through [`CodecError`] at the decode boundary
//! and turned into "skip this record" by the scanners. Only file access,
//! configuration and worker failures reach the caller of a whole-log read.

use std::fmt;

/// Errors that can occur while decoding a telemetry log.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Malformed text: configuration document, strategy name
    ParseError {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Schema record that cannot be installed
    InvalidSchema {
        /// Name declared by the schema record
        schema_name: String,
        /// Why the record was rejected
        reason: String,
    },

    /// Payload shorter than its field plan
    BufferTooShort {
        /// Bytes the plan needs
        requested: usize,
        /// Bytes the record carries
        available: usize,
        /// Offset inside the payload where reading stopped
        cursor_pos: u64,
    },

    /// A single field could not be decoded
    FieldDecodeError {
        /// Column name
        field_name: String,
        /// Format code of the field
        format_code: char,
        /// Cause of the failure
        cause: String,
    },

    /// Format code or file type not described by the configuration
    Unsupported {
        /// What is not supported
        feature: String,
    },

    /// File access error (open, metadata, mmap)
    Io {
        /// Operation that failed
        context: String,
        /// Error message
        message: String,
    },

    /// Invalid configuration value
    Config {
        /// Offending configuration key
        key: String,
        /// Validation error message
        reason: String,
    },

    /// Parallel worker setup or fan-in failure
    Worker {
        /// Error message
        message: String,
    },
}

impl CodecError {
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn invalid_schema(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidSchema {
            schema_name: schema_name.into(),
            reason: reason.into(),
        }
    }

    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        CodecError::BufferTooShort {
            requested,
            available,
            cursor_pos,
        }
    }

    pub fn field_decode(
        field_name: impl Into<String>,
        format_code: char,
        cause: impl Into<String>,
    ) -> Self {
        CodecError::FieldDecodeError {
            field_name: field_name.into(),
            format_code,
            cause: cause.into(),
        }
    }

    pub fn unsupported(feature: impl Into<String>) -> Self {
        CodecError::Unsupported {
            feature: feature.into(),
        }
    }

    pub fn io(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::Io {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn worker(message: impl Into<String>) -> Self {
        CodecError::Worker {
            message: message.into(),
        }
    }

    /// Errors that only cost one record; the scan continues past them.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            CodecError::InvalidSchema { .. }
                | CodecError::BufferTooShort { .. }
                | CodecError::FieldDecodeError { .. }
                | CodecError::Unsupported { .. }
        )
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ParseError { context, message } => {
                write!(f, "Parse error in {context}: {message}")
            }
            CodecError::InvalidSchema {
                schema_name,
                reason,
            } => write!(f, "Rejected schema '{schema_name}': {reason}"),
            CodecError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => write!(
                f,
                "Payload too short: field at byte {cursor_pos} needs {requested} bytes, record has {available}"
            ),
            CodecError::FieldDecodeError {
                field_name,
                format_code,
                cause,
            } => write!(f, "Cannot decode column '{field_name}' ('{format_code}'): {cause}"),
            CodecError::Unsupported { feature } => write!(f, "Unsupported {feature}"),
            CodecError::Io { context, message } => write!(f, "{context}: {message}"),
            CodecError::Config { key, reason } => {
                write!(f, "Invalid configuration '{key}': {reason}")
            }
            CodecError::Worker { message } => write!(f, "Parallel decode failed: {message}"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::io("IO", err.to_string())
    }
}

/// Result type for mavlog operations.
pub type Result<T> = std::result::Result<T, CodecError>;
