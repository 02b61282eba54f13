// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoder configuration.
//!
//! Everything that describes the binary framing and the value semantics of a
//! log lives in [`DecoderConfig`]: sync marker, schema record type and length,
//! the format-code table, scale overrides and the rounding column set. The
//! configuration is handed to readers at construction time and never mutated
//! afterwards.
//!
//! Configurations can be loaded from TOML or JSON:
//!
//! ```toml
//! sync_marker = "a395"
//! schema_type = 128
//! schema_length = 89
//!
//! [format_codes]
//! f = "float32"
//! N = { char = 16 }
//! a = { array = "int16", len = 32 }
//!
//! [format_scales]
//! L = 1e-7
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::PrimitiveType;
use crate::schema::SCHEMA_LAYOUT_SIZE;
use crate::{CodecError, Result};

/// Reference sync marker preceding every record.
pub const DEFAULT_SYNC_MARKER: [u8; 2] = [0xA3, 0x95];

/// Reference type id of schema (FMT) records.
pub const DEFAULT_SCHEMA_TYPE: u8 = 0x80;

/// Reference total length of a schema record, header included.
pub const DEFAULT_SCHEMA_LENGTH: usize = 89;

/// Schemas are expected to be declared within this many leading bytes.
pub const DEFAULT_HEAD_SCAN_LIMIT: usize = 50_000_000;

/// Upper bound on parallel workers.
pub const DEFAULT_MAX_WORKERS: usize = 16;

/// Column whose character buffer is kept as raw bytes.
pub const DEFAULT_RAW_COLUMN: &str = "Data";

/// Columns whose floating-point values are rounded to 7 fractional digits.
const DEFAULT_ROUNDING_COLUMNS: &[&str] = &[
    "Lat", "Lng", "TLat", "TLng", "Pitch", "IPE", "Yaw", "IPN", "IYAW", "DesPitch", "NavPitch",
    "Temp", "AltE", "VDop", "VAcc", "Roll", "HAGL", "SM", "VWN", "VWE", "IVT", "SAcc", "TAW",
    "IPD", "ErrRP", "SVT", "SP", "TAT", "GZ", "HDop", "NavRoll", "NavBrg", "TAsp", "HAcc",
    "DesRoll", "SH", "TBrg", "AX",
];

/// Binary layout of a single format code.
///
/// Serialized untagged so configuration files stay compact:
/// `"int32"`, `{ char = 16 }`, `{ array = "int16", len = 32 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatKind {
    /// Fixed-width little-endian number
    Numeric(PrimitiveType),
    /// Fixed-length zero-padded character buffer
    Char {
        /// Buffer length in bytes
        char: usize,
    },
    /// Fixed-length numeric array
    Array {
        /// Element type
        array: PrimitiveType,
        /// Number of elements
        len: usize,
    },
}

impl FormatKind {
    /// Number of payload bytes this code occupies.
    pub fn width(&self) -> usize {
        match *self {
            FormatKind::Numeric(ty) => ty.size(),
            FormatKind::Char { char } => char,
            FormatKind::Array { array, len } => array.size() * len,
        }
    }
}

/// Complete decoder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Two bytes that open every record
    #[serde(with = "hex_marker")]
    pub sync_marker: [u8; 2],
    /// Type id reserved for schema records
    pub schema_type: u8,
    /// Total length of a schema record in bytes
    pub schema_length: usize,
    /// Format code -> binary layout
    pub format_codes: BTreeMap<char, FormatKind>,
    /// Per-column scale overrides (highest priority)
    pub field_scales: BTreeMap<String, f64>,
    /// Per-format-code default scales
    pub format_scales: BTreeMap<char, f64>,
    /// Columns rounded to 7 fractional digits
    pub rounding_columns: BTreeSet<String>,
    /// Enables the general rounding rule
    pub rounding_enabled: bool,
    /// Character column preserved as raw bytes
    pub raw_column: String,
    /// Byte bound of the schema pre-scan used before chunking
    pub head_scan_limit: usize,
    /// Upper bound on parallel workers
    pub max_workers: usize,
    /// Default input file
    pub file_path: Option<PathBuf>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        use PrimitiveType::*;

        let format_codes = BTreeMap::from([
            ('a', FormatKind::Array { array: Int16, len: 32 }),
            ('b', FormatKind::Numeric(Int8)),
            ('B', FormatKind::Numeric(UInt8)),
            ('h', FormatKind::Numeric(Int16)),
            ('H', FormatKind::Numeric(UInt16)),
            ('i', FormatKind::Numeric(Int32)),
            ('I', FormatKind::Numeric(UInt32)),
            ('f', FormatKind::Numeric(Float32)),
            ('d', FormatKind::Numeric(Float64)),
            ('n', FormatKind::Char { char: 4 }),
            ('N', FormatKind::Char { char: 16 }),
            ('Z', FormatKind::Char { char: 64 }),
            ('c', FormatKind::Numeric(Int16)),
            ('C', FormatKind::Numeric(UInt16)),
            ('e', FormatKind::Numeric(Int32)),
            ('E', FormatKind::Numeric(UInt32)),
            ('L', FormatKind::Numeric(Int32)),
            ('M', FormatKind::Numeric(UInt8)),
            ('q', FormatKind::Numeric(Int64)),
            ('Q', FormatKind::Numeric(UInt64)),
        ]);

        let format_scales = BTreeMap::from([
            ('c', 0.01),
            ('C', 0.01),
            ('e', 0.01),
            ('E', 0.01),
            ('L', 1e-7),
        ]);

        Self {
            sync_marker: DEFAULT_SYNC_MARKER,
            schema_type: DEFAULT_SCHEMA_TYPE,
            schema_length: DEFAULT_SCHEMA_LENGTH,
            format_codes,
            field_scales: BTreeMap::new(),
            format_scales,
            rounding_columns: DEFAULT_ROUNDING_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rounding_enabled: true,
            raw_column: DEFAULT_RAW_COLUMN.to_string(),
            head_scan_limit: DEFAULT_HEAD_SCAN_LIMIT,
            max_workers: DEFAULT_MAX_WORKERS,
            file_path: None,
        }
    }
}

impl DecoderConfig {
    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| CodecError::parse("DecoderConfig", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document. Missing keys take their default values.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| CodecError::parse("DecoderConfig", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the syntax by extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CodecError::io(
                "DecoderConfig::load",
                format!("Failed to read '{}': {e}", path.display()),
            )
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(CodecError::unsupported(format!(
                "configuration extension {other:?} (expected .toml or .json)"
            ))),
        }
    }

    /// Check values that would make scanning or decoding ill-defined.
    pub fn validate(&self) -> Result<()> {
        if self.schema_length < SCHEMA_LAYOUT_SIZE {
            return Err(CodecError::config(
                "schema_length",
                format!(
                    "{} is shorter than the schema record layout ({SCHEMA_LAYOUT_SIZE} bytes)",
                    self.schema_length
                ),
            ));
        }
        if self.max_workers == 0 {
            return Err(CodecError::config("max_workers", "must be at least 1"));
        }
        if let Some((code, _)) = self.format_codes.iter().find(|(_, k)| k.width() == 0) {
            return Err(CodecError::config(
                "format_codes",
                format!("code '{code}' has zero width"),
            ));
        }
        for (key, scale) in self
            .field_scales
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .chain(self.format_scales.iter().map(|(k, v)| (k.to_string(), *v)))
        {
            if !scale.is_finite() {
                return Err(CodecError::config(
                    "scales",
                    format!("scale for '{key}' is not finite"),
                ));
            }
        }
        Ok(())
    }

    /// Binary layout of a format code.
    pub fn format_kind(&self, code: char) -> Option<FormatKind> {
        self.format_codes.get(&code).copied()
    }

    /// Resolve the scale of a numeric column.
    ///
    /// Column overrides win over format-code defaults; a zero entry counts as
    /// absent so that it falls through to the next level.
    pub fn resolve_scale(&self, column: &str, code: char) -> f64 {
        self.field_scales
            .get(column)
            .copied()
            .filter(|s| *s != 0.0)
            .or_else(|| {
                self.format_scales
                    .get(&code)
                    .copied()
                    .filter(|s| *s != 0.0)
            })
            .unwrap_or(1.0)
    }

    /// Whether the general rounding rule applies to a column.
    pub fn rounds_column(&self, column: &str) -> bool {
        self.rounding_enabled && self.rounding_columns.contains(column)
    }
}

/// Sync marker as a hex string (`"a395"`).
mod hex_marker {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(marker: &[u8; 2], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(marker))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 2], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim()).map_err(de::Error::custom)?;
        <[u8; 2]>::try_from(bytes.as_slice())
            .map_err(|_| de::Error::custom(format!("sync marker must be 2 bytes, got {}", bytes.len())))
    }
}
