// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoded values and messages.
//!
//! Provides the value representation for decoded log messages. Every message
//! is an ordered list of named fields, the first of which is always the
//! `mavpackettype` discriminator carrying the schema name.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Reserved field holding the schema name of a decoded message.
pub const MSG_TYPE_FIELD: &str = "mavpackettype";

/// Unified value type for decoded telemetry fields.
///
/// Integer variants keep the width declared by the schema. Floating-point
/// fields (including 32-bit floats and every scaled integer) are widened to
/// `Float64` so that scaling and rounding operate in double precision.
///
/// Serialized untagged, so JSON output is plain numbers, strings and arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CodecValue {
    // Signed integers
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),

    // Unsigned integers
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),

    // Floating point
    Float64(f64),

    // Zero-trimmed ASCII text
    String(String),

    // Uninterpreted bytes (the raw `Data` column)
    Bytes(Vec<u8>),

    // Fixed-length numeric sequence
    Array(Vec<CodecValue>),
}

impl CodecValue {
    /// Numeric value widened to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CodecValue::Int8(v) => Some(*v as f64),
            CodecValue::Int16(v) => Some(*v as f64),
            CodecValue::Int32(v) => Some(*v as f64),
            CodecValue::Int64(v) => Some(*v as f64),
            CodecValue::UInt8(v) => Some(*v as f64),
            CodecValue::UInt16(v) => Some(*v as f64),
            CodecValue::UInt32(v) => Some(*v as f64),
            CodecValue::UInt64(v) => Some(*v as f64),
            CodecValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CodecValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CodecValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get the inner array.
    pub fn as_array(&self) -> Option<&[CodecValue]> {
        match self {
            CodecValue::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

impl fmt::Display for CodecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecValue::Int8(v) => write!(f, "{v}"),
            CodecValue::Int16(v) => write!(f, "{v}"),
            CodecValue::Int32(v) => write!(f, "{v}"),
            CodecValue::Int64(v) => write!(f, "{v}"),
            CodecValue::UInt8(v) => write!(f, "{v}"),
            CodecValue::UInt16(v) => write!(f, "{v}"),
            CodecValue::UInt32(v) => write!(f, "{v}"),
            CodecValue::UInt64(v) => write!(f, "{v}"),
            CodecValue::Float64(v) => write!(f, "{v}"),
            CodecValue::String(v) => write!(f, "\"{v}\""),
            CodecValue::Bytes(v) => write!(f, "0x{}", hex::encode(v)),
            CodecValue::Array(v) => {
                write!(f, "[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A decoded log message: ordered field name -> value pairs.
///
/// Field names are shared with the compiled field plan, so building a message
/// never copies column names.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    fields: Vec<(Arc<str>, CodecValue)>,
}

impl DecodedMessage {
    /// Create a message carrying only the discriminator field.
    pub fn new(msg_type: &str) -> Self {
        Self::with_capacity(msg_type, 0)
    }

    /// Create a message with room for `capacity` additional fields.
    pub fn with_capacity(msg_type: &str, capacity: usize) -> Self {
        let mut fields = Vec::with_capacity(capacity + 1);
        fields.push((
            Arc::from(MSG_TYPE_FIELD),
            CodecValue::String(msg_type.to_string()),
        ));
        Self { fields }
    }

    /// Append a field. Order of insertion is the output order.
    pub fn push(&mut self, name: impl Into<Arc<str>>, value: CodecValue) {
        self.fields.push((name.into(), value));
    }

    /// The schema name stored in the discriminator field.
    pub fn msg_type(&self) -> &str {
        self.fields
            .first()
            .and_then(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&CodecValue> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// Iterate over fields in declared order, discriminator first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CodecValue)> {
        self.fields.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Field names in declared order, discriminator first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_ref())
    }

    /// Number of fields including the discriminator.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// A message always has its discriminator, so it is never empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for DecodedMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name.as_ref(), value)?;
        }
        map.end()
    }
}

impl fmt::Display for DecodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg_type())?;
        write!(f, " {{")?;
        for (i, (name, value)) in self.fields.iter().skip(1).enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {name}: {value}")?;
        }
        write!(f, " }}")
    }
}

/// Fixed-width numeric types a format code can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
}

impl PrimitiveType {
    /// Size in bytes of the little-endian encoding.
    pub const fn size(self) -> usize {
        match self {
            PrimitiveType::Int8 | PrimitiveType::UInt8 => 1,
            PrimitiveType::Int16 | PrimitiveType::UInt16 => 2,
            PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float32 => 4,
            PrimitiveType::Int64 | PrimitiveType::UInt64 | PrimitiveType::Float64 => 8,
        }
    }
}
