// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Plan-driven payload decoder.
//!
//! Executes a compiled [`FieldPlan`] against the payload bytes of one data
//! record. All reads are little-endian and bounded by the record: a plan that
//! needs more bytes than the record carries fails with
//! [`CodecError::BufferTooShort`] instead of reading into the next record.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{CodecValue, DecodedMessage, PrimitiveType};
use crate::schema::record::{ascii_text, until_first_zero};
use crate::schema::{FieldOp, FieldPlan, MessageSchema};
use crate::{CodecError, Result};

/// Number of fractional digits kept by the rounding rule.
const ROUND_DIGITS: i32 = 7;

/// Stateless decoder for data record payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageDecoder;

impl MessageDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self
    }

    /// Decode the payload of a record (the bytes after its 3-byte header).
    pub fn decode(&self, schema: &MessageSchema, payload: &[u8]) -> Result<DecodedMessage> {
        let plan = schema.plan()?;
        self.decode_with_plan(schema.name(), plan, payload)
    }

    /// Decode a payload with an explicit plan.
    pub fn decode_with_plan(
        &self,
        schema_name: &str,
        plan: &FieldPlan,
        payload: &[u8],
    ) -> Result<DecodedMessage> {
        if payload.len() < plan.payload_size {
            return Err(CodecError::buffer_too_short(
                plan.payload_size,
                payload.len(),
                0,
            ));
        }

        let mut msg = DecodedMessage::with_capacity(schema_name, plan.len());
        for field in &plan.fields {
            let bytes = &payload[field.offset..field.offset + field.op.width()];
            let value = match field.op {
                FieldOp::Numeric { ty, scale, round } => {
                    let mut value = read_primitive(ty, bytes);
                    if scale != 1.0 {
                        let raw = value.as_f64().ok_or_else(|| {
                            CodecError::field_decode(
                                &*field.column,
                                field.code,
                                "scale applied to a non-numeric value",
                            )
                        })?;
                        value = CodecValue::Float64(raw * scale);
                    }
                    match value {
                        CodecValue::Float64(v) if round => CodecValue::Float64(round_fraction(v)),
                        other => other,
                    }
                }
                FieldOp::String { raw: true, .. } => CodecValue::Bytes(bytes.to_vec()),
                FieldOp::String { raw: false, .. } => {
                    CodecValue::String(ascii_text(until_first_zero(bytes)))
                }
                FieldOp::Array { element, len } => CodecValue::Array(
                    bytes
                        .chunks_exact(element.size())
                        .take(len)
                        .map(|b| read_primitive(element, b))
                        .collect(),
                ),
            };
            msg.push(field.column.clone(), value);
        }

        Ok(msg)
    }
}

/// Read one little-endian primitive. `bytes` holds exactly `ty.size()` bytes.
fn read_primitive(ty: PrimitiveType, bytes: &[u8]) -> CodecValue {
    match ty {
        PrimitiveType::Int8 => CodecValue::Int8(bytes[0] as i8),
        PrimitiveType::UInt8 => CodecValue::UInt8(bytes[0]),
        PrimitiveType::Int16 => CodecValue::Int16(LittleEndian::read_i16(bytes)),
        PrimitiveType::UInt16 => CodecValue::UInt16(LittleEndian::read_u16(bytes)),
        PrimitiveType::Int32 => CodecValue::Int32(LittleEndian::read_i32(bytes)),
        PrimitiveType::UInt32 => CodecValue::UInt32(LittleEndian::read_u32(bytes)),
        PrimitiveType::Int64 => CodecValue::Int64(LittleEndian::read_i64(bytes)),
        PrimitiveType::UInt64 => CodecValue::UInt64(LittleEndian::read_u64(bytes)),
        PrimitiveType::Float32 => CodecValue::Float64(LittleEndian::read_f32(bytes) as f64),
        PrimitiveType::Float64 => CodecValue::Float64(LittleEndian::read_f64(bytes)),
    }
}

/// Round to 7 fractional digits, half to even on the exact binary value.
///
/// Most values take the arithmetic path: when `v * 1e7` is not close to a
/// half, the nearest integer is unambiguous and dividing it by `1e7` yields
/// the double nearest to the decimal result. Values close to a tie, or too
/// large for the integer path, go through exact decimal formatting.
pub fn round_fraction(v: f64) -> f64 {
    if !v.is_finite() {
        return v;
    }

    let factor = 10f64.powi(ROUND_DIGITS);
    let scaled = v * factor;
    if scaled.abs() < (1u64 << 52) as f64 {
        let frac = (scaled - scaled.trunc()).abs();
        if (frac - 0.5).abs() > 1e-6 {
            return scaled.round() / factor;
        }
    }

    format!("{v:.prec$}", prec = ROUND_DIGITS as usize)
        .parse()
        .unwrap_or(v)
}
