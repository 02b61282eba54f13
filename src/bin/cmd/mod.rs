// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod chunks;
mod decode;
mod info;
mod schemas;

pub use chunks::ChunksCmd;
pub use decode::DecodeCmd;
pub use info::InfoCmd;
pub use schemas::SchemasCmd;
