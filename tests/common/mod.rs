// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use mavlog::{CodecValue, DecodedMessage};

// ============================================================================
// Log Builder
// ============================================================================

pub const SYNC: [u8; 2] = [0xA3, 0x95];
pub const SCHEMA_TYPE: u8 = 0x80;
pub const SCHEMA_LEN: usize = 89;

/// Builds synthetic logs in memory, record by record.
#[derive(Debug, Default, Clone)]
pub struct LogBuilder {
    bytes: Vec<u8>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a schema record. `length` is the full record length of the
    /// declared type, header included.
    pub fn schema(mut self, type_id: u8, length: u8, name: &str, format: &str, columns: &str) -> Self {
        self.bytes.extend_from_slice(&schema_record(type_id, length, name, format, columns));
        self
    }

    /// Append a data record with an already encoded payload.
    pub fn record(mut self, type_id: u8, payload: &[u8]) -> Self {
        self.bytes.extend_from_slice(&SYNC);
        self.bytes.push(type_id);
        self.bytes.extend_from_slice(payload);
        self
    }

    /// Append bytes that are not part of any record.
    pub fn noise(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encode one schema record.
pub fn schema_record(type_id: u8, length: u8, name: &str, format: &str, columns: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(SCHEMA_LEN);
    out.extend_from_slice(&SYNC);
    out.push(SCHEMA_TYPE);
    out.push(type_id);
    out.push(length);
    out.extend_from_slice(&padded(name.as_bytes(), 4));
    out.extend_from_slice(&padded(format.as_bytes(), 16));
    out.extend_from_slice(&padded(columns.as_bytes(), 64));
    out
}

/// Zero-pad (or cut) to a fixed width.
pub fn padded(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut out = bytes[..bytes.len().min(width)].to_vec();
    out.resize(width, 0);
    out
}

/// GPS payload for format "QBLLdc": TimeUS, Status, Lat, Lng, Alt, Spd.
pub fn gps_payload(time_us: u64, status: u8, lat: i32, lng: i32, alt: f64, spd: i16) -> Vec<u8> {
    let mut p = Vec::with_capacity(27);
    p.extend_from_slice(&time_us.to_le_bytes());
    p.push(status);
    p.extend_from_slice(&lat.to_le_bytes());
    p.extend_from_slice(&lng.to_le_bytes());
    p.extend_from_slice(&alt.to_le_bytes());
    p.extend_from_slice(&spd.to_le_bytes());
    p
}

/// ATT payload for format "Qff": TimeUS, Roll, Pitch.
pub fn att_payload(time_us: u64, roll: f32, pitch: f32) -> Vec<u8> {
    let mut p = Vec::with_capacity(16);
    p.extend_from_slice(&time_us.to_le_bytes());
    p.extend_from_slice(&roll.to_le_bytes());
    p.extend_from_slice(&pitch.to_le_bytes());
    p
}

/// MSG payload for format "QZ": TimeUS, Message.
pub fn msg_payload(time_us: u64, text: &str) -> Vec<u8> {
    let mut p = time_us.to_le_bytes().to_vec();
    p.extend_from_slice(&padded(text.as_bytes(), 64));
    p
}

/// Record lengths (header included) of the sample types.
pub const GPS_LEN: u8 = 3 + 27;
pub const ATT_LEN: u8 = 3 + 16;
pub const MSG_LEN: u8 = 3 + 72;

/// A flight-like log: three schemas followed by `rounds` interleaved GPS,
/// ATT and MSG records, with a little noise every tenth round.
pub fn sample_flight(rounds: usize) -> Vec<u8> {
    let mut log = LogBuilder::new()
        .schema(10, GPS_LEN, "GPS", "QBLLdc", "TimeUS,Status,Lat,Lng,Alt,Spd")
        .schema(11, ATT_LEN, "ATT", "Qff", "TimeUS,Roll,Pitch")
        .schema(12, MSG_LEN, "MSG", "QZ", "TimeUS,Message");

    for i in 0..rounds {
        let t = 1_000 * i as u64;
        log = log
            .record(
                10,
                &gps_payload(t, 3, 500_000_000 + i as i32, -1_234_567_891, 100.0 + i as f64 * 0.25, 1234),
            )
            .record(11, &att_payload(t + 1, 0.5, -0.25));
        if i % 5 == 0 {
            log = log.record(12, &msg_payload(t + 2, &format!("waypoint {i}")));
        }
        if i % 10 == 9 {
            log = log.noise(&[0x00, 0xA3, 0x11]);
        }
    }
    log.build()
}

// ============================================================================
// Files
// ============================================================================

/// A log written to the temp directory, removed on drop.
pub struct TempLog {
    pub path: PathBuf,
}

impl TempLog {
    pub fn new(name: &str, bytes: &[u8]) -> Self {
        let path = std::env::temp_dir().join(format!(
            "mavlog_{}_{}_{}.bin",
            name,
            std::process::id(),
            unique_suffix()
        ));
        std::fs::write(&path, bytes).expect("write temp log");
        Self { path }
    }

    pub fn path_str(&self) -> &str {
        self.path.to_str().expect("temp path is UTF-8")
    }
}

impl Drop for TempLog {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn unique_suffix() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT: AtomicU64 = AtomicU64::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

// ============================================================================
// Assertions
// ============================================================================

pub fn field_f64(msg: &DecodedMessage, name: &str) -> f64 {
    msg.get(name)
        .and_then(CodecValue::as_f64)
        .unwrap_or_else(|| panic!("{} has no numeric field {name}: {msg}", msg.msg_type()))
}

pub fn field_str<'a>(msg: &'a DecodedMessage, name: &str) -> &'a str {
    msg.get(name)
        .and_then(CodecValue::as_str)
        .unwrap_or_else(|| panic!("{} has no string field {name}: {msg}", msg.msg_type()))
}

pub fn types_of(messages: &[DecodedMessage]) -> Vec<&str> {
    messages.iter().map(DecodedMessage::msg_type).collect()
}
