// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Payload decoding.
//!
//! - [`decoder`] - executes compiled field plans against record payloads

pub mod decoder;

pub use decoder::{round_fraction, MessageDecoder};
