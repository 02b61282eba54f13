// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field plan compilation.
//!
//! A field plan resolves everything about a schema that does not depend on
//! the payload bytes: the binary layout of each format code, field offsets,
//! scale factors and rounding flags. Plans are compiled once per schema when
//! the schema is registered and reused for every record of that type.

use std::fmt;
use std::sync::Arc;

use crate::config::{DecoderConfig, FormatKind};
use crate::core::PrimitiveType;
use crate::{CodecError, Result};

/// How a single field is turned into a value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Read a little-endian number, then scale and optionally round it.
    Numeric {
        /// Binary type of the field
        ty: PrimitiveType,
        /// Multiplier applied after reading (1.0 means none)
        scale: f64,
        /// Round the result to 7 fractional digits when it is a float
        round: bool,
    },

    /// Read a fixed-length character buffer.
    String {
        /// Buffer length in bytes
        width: usize,
        /// Keep the bytes as-is instead of decoding text
        raw: bool,
    },

    /// Read a fixed-length numeric array. Elements are not scaled.
    Array {
        /// Element type
        element: PrimitiveType,
        /// Number of elements
        len: usize,
    },
}

impl FieldOp {
    /// Number of payload bytes this operation consumes.
    pub fn width(&self) -> usize {
        match *self {
            FieldOp::Numeric { ty, .. } => ty.size(),
            FieldOp::String { width, .. } => width,
            FieldOp::Array { element, len } => element.size() * len,
        }
    }
}

/// A named field with its payload offset.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedField {
    /// Column name, shared with every decoded message
    pub column: Arc<str>,
    /// Format code the field was declared with
    pub code: char,
    /// Byte offset inside the payload
    pub offset: usize,
    /// Decode operation
    pub op: FieldOp,
}

/// Compiled decode plan for one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan {
    /// Fields in declared order
    pub fields: Vec<PlannedField>,
    /// Bytes covered by all format codes, including codes without a column
    pub payload_size: usize,
}

impl FieldPlan {
    /// Compile a plan from a format string and its columns.
    ///
    /// Format codes and columns are paired positionally. Codes past the last
    /// column still occupy payload bytes; columns past the last code are
    /// ignored. An unknown format code fails the whole plan.
    pub fn compile(
        schema_name: &str,
        format: &str,
        columns: &[String],
        config: &DecoderConfig,
    ) -> Result<Self> {
        let mut fields = Vec::with_capacity(columns.len().min(format.len()));
        let mut offset = 0usize;

        for (idx, code) in format.chars().enumerate() {
            let kind = config.format_kind(code).ok_or_else(|| {
                CodecError::unsupported(format!(
                    "format code '{code}' in schema '{schema_name}'"
                ))
            })?;
            let width = kind.width();

            if let Some(column) = columns.get(idx) {
                let op = match kind {
                    FormatKind::Numeric(ty) => FieldOp::Numeric {
                        ty,
                        scale: config.resolve_scale(column, code),
                        round: config.rounds_column(column)
                            || is_positioning_altitude(schema_name, column),
                    },
                    FormatKind::Char { char } => FieldOp::String {
                        width: char,
                        raw: *column == config.raw_column,
                    },
                    FormatKind::Array { array, len } => FieldOp::Array {
                        element: array,
                        len,
                    },
                };
                fields.push(PlannedField {
                    column: Arc::from(column.as_str()),
                    code,
                    offset,
                    op,
                });
            }

            offset += width;
        }

        Ok(Self {
            fields,
            payload_size: offset,
        })
    }

    /// Number of named fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the plan has no named fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// GPS altitude is always rounded, independent of the rounding toggle.
fn is_positioning_altitude(schema_name: &str, column: &str) -> bool {
    schema_name == "GPS" && column == "Alt"
}

impl fmt::Display for FieldPlan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "FieldPlan ({} bytes):", self.payload_size)?;
        for field in &self.fields {
            writeln!(
                f,
                "  {:3}: {} '{}' {:?}",
                field.offset, field.column, field.code, field.op
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compile_offsets_and_size() {
        let config = DecoderConfig::default();
        let plan = FieldPlan::compile("ATT", "QffB", &columns(&["TimeUS", "Roll", "Pitch", "Mode"]), &config)
            .unwrap();

        assert_eq!(plan.payload_size, 8 + 4 + 4 + 1);
        let offsets: Vec<usize> = plan.fields.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 8, 12, 16]);
        assert_eq!(
            plan.fields[1].op,
            FieldOp::Numeric {
                ty: PrimitiveType::Float32,
                scale: 1.0,
                round: true
            }
        );
    }

    #[test]
    fn test_compile_scales() {
        let config = DecoderConfig::default();
        let plan = FieldPlan::compile("POS", "Lc", &columns(&["Lat", "Spd"]), &config).unwrap();
        assert_eq!(
            plan.fields[0].op,
            FieldOp::Numeric {
                ty: PrimitiveType::Int32,
                scale: 1e-7,
                round: true
            }
        );
        assert_eq!(
            plan.fields[1].op,
            FieldOp::Numeric {
                ty: PrimitiveType::Int16,
                scale: 0.01,
                round: false
            }
        );
    }

    #[test]
    fn test_more_codes_than_columns() {
        let config = DecoderConfig::default();
        let plan = FieldPlan::compile("X", "BIh", &columns(&["A"]), &config).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.payload_size, 1 + 4 + 2);
    }

    #[test]
    fn test_more_columns_than_codes() {
        let config = DecoderConfig::default();
        let plan = FieldPlan::compile("X", "B", &columns(&["A", "B", "C"]), &config).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.payload_size, 1);
    }

    #[test]
    fn test_raw_data_column() {
        let config = DecoderConfig::default();
        let plan = FieldPlan::compile("DATA", "ZN", &columns(&["Data", "Name"]), &config).unwrap();
        assert_eq!(plan.fields[0].op, FieldOp::String { width: 64, raw: true });
        assert_eq!(plan.fields[1].op, FieldOp::String { width: 16, raw: false });
    }

    #[test]
    fn test_array_code() {
        let config = DecoderConfig::default();
        let plan = FieldPlan::compile("ISBD", "a", &columns(&["Samples"]), &config).unwrap();
        assert_eq!(
            plan.fields[0].op,
            FieldOp::Array {
                element: PrimitiveType::Int16,
                len: 32
            }
        );
        assert_eq!(plan.payload_size, 64);
    }

    #[test]
    fn test_unknown_code_fails() {
        let config = DecoderConfig::default();
        let err = FieldPlan::compile("BAD", "B?", &columns(&["A", "B"]), &config).unwrap_err();
        assert!(matches!(err, CodecError::Unsupported { .. }));
    }

    #[test]
    fn test_gps_altitude_rounds_without_toggle() {
        let mut config = DecoderConfig::default();
        config.rounding_enabled = false;

        let gps = FieldPlan::compile("GPS", "Lf", &columns(&["Lat", "Alt"]), &config).unwrap();
        assert!(matches!(gps.fields[0].op, FieldOp::Numeric { round: false, .. }));
        assert!(matches!(gps.fields[1].op, FieldOp::Numeric { round: true, .. }));

        let baro = FieldPlan::compile("BARO", "f", &columns(&["Alt"]), &config).unwrap();
        assert!(matches!(baro.fields[0].op, FieldOp::Numeric { round: false, .. }));
    }

    #[test]
    fn test_display() {
        let config = DecoderConfig::default();
        let plan = FieldPlan::compile("X", "B", &columns(&["Mode"]), &config).unwrap();
        let text = plan.to_string();
        assert!(text.starts_with("FieldPlan (1 bytes):"));
        assert!(text.contains("Mode 'B'"));
    }
}
