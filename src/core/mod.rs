// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout mavlog.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Error handling
//! - [`CodecValue`] - Decoded field values
//! - [`DecodedMessage`] - Ordered named-field messages

pub mod error;
pub mod value;

pub use error::{CodecError, Result};
pub use value::{CodecValue, DecodedMessage, PrimitiveType, MSG_TYPE_FIELD};
