// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sequential decoding of synthetic logs.
//!
//! Run with: cargo test --test sequential_tests

mod common;

use common::*;
use mavlog::io::{CancelToken, SequentialReader, TypeFilter};
use mavlog::{CodecValue, DecoderConfig, MSG_TYPE_FIELD};

fn decode(bytes: Vec<u8>) -> Vec<mavlog::DecodedMessage> {
    SequentialReader::from_bytes(bytes, DecoderConfig::default())
        .unwrap()
        .parse_all()
}

#[test]
fn test_sample_flight_values() {
    let messages = decode(sample_flight(1));

    assert_eq!(types_of(&messages), vec!["FMT", "FMT", "FMT", "GPS", "ATT", "MSG"]);

    let gps = &messages[3];
    assert_eq!(gps.keys().next(), Some(MSG_TYPE_FIELD));
    assert_eq!(gps.get("TimeUS"), Some(&CodecValue::UInt64(0)));
    assert_eq!(gps.get("Status"), Some(&CodecValue::UInt8(3)));
    assert_eq!(field_f64(gps, "Lat"), 50.0);
    assert_eq!(field_f64(gps, "Lng"), -123.4567891);
    assert_eq!(field_f64(gps, "Alt"), 100.0);
    assert_eq!(field_f64(gps, "Spd"), 12.34);

    let att = &messages[4];
    assert_eq!(field_f64(att, "Roll"), 0.5);
    assert_eq!(field_f64(att, "Pitch"), -0.25);

    assert_eq!(field_str(&messages[5], "Message"), "waypoint 0");
}

#[test]
fn test_gps_end_to_end() {
    let mut payload = 500_000_000i32.to_le_bytes().to_vec();
    payload.extend_from_slice(&123.456789123f64.to_le_bytes());
    let log = LogBuilder::new()
        .schema(1, 3 + 12, "GPS", "Ld", "Lat,Alt")
        .record(1, &payload)
        .build();

    let messages = SequentialReader::from_bytes(log, DecoderConfig::default())
        .unwrap()
        .with_filter(TypeFilter::include(["FMT", "GPS"]))
        .parse_all();

    assert_eq!(types_of(&messages), vec!["FMT", "GPS"]);
    let gps = &messages[1];
    assert_eq!(gps.len(), 3);
    assert_eq!(field_f64(gps, "Lat"), 50.0);
    assert_eq!(field_f64(gps, "Alt"), 123.4567891);
}

#[test]
fn test_decoding_twice_is_identical() {
    let log = sample_flight(30);
    assert_eq!(decode(log.clone()), decode(log));
}

#[test]
fn test_schema_acknowledgements() {
    let messages = decode(sample_flight(0));
    assert_eq!(messages.len(), 3);

    let fmt = &messages[0];
    assert_eq!(fmt.msg_type(), "FMT");
    assert_eq!(fmt.get("Type"), Some(&CodecValue::UInt8(10)));
    assert_eq!(fmt.get("Length"), Some(&CodecValue::UInt8(GPS_LEN)));
    assert_eq!(field_str(fmt, "Name"), "GPS");
    assert_eq!(field_str(fmt, "Format"), "QBLLdc");
    assert_eq!(field_str(fmt, "Columns"), "TimeUS,Status,Lat,Lng,Alt,Spd");
}

#[test]
fn test_message_counts_with_noise() {
    let rounds = 40;
    let messages = decode(sample_flight(rounds));
    // 3 schemas, GPS and ATT every round, MSG every fifth round
    assert_eq!(messages.len(), 3 + 2 * rounds + rounds / 5);

    let gps: Vec<_> = messages.iter().filter(|m| m.msg_type() == "GPS").collect();
    assert_eq!(gps.len(), rounds);
    assert_eq!(field_f64(gps[39], "Alt"), 109.75);
    assert_eq!(field_f64(gps[39], "Lat"), 50.0000039);
}

#[test]
fn test_data_before_schema_is_skipped() {
    let log = LogBuilder::new()
        .record(11, &att_payload(1, 0.5, 0.5))
        .schema(11, ATT_LEN, "ATT", "Qff", "TimeUS,Roll,Pitch")
        .record(11, &att_payload(2, 0.5, 0.5))
        .build();

    let messages = decode(log);
    assert_eq!(types_of(&messages), vec!["FMT", "ATT"]);
    assert_eq!(messages[1].get("TimeUS"), Some(&CodecValue::UInt64(2)));
}

#[test]
fn test_unknown_types_and_garbage_are_skipped() {
    let log = LogBuilder::new()
        .noise(&[0xFF; 7])
        .schema(11, ATT_LEN, "ATT", "Qff", "TimeUS,Roll,Pitch")
        .record(99, &[1, 2, 3, 4])
        .noise(&[0xA3, 0xA3, 0x95])
        .record(11, &att_payload(7, 1.0, 2.0))
        .build();

    let messages = decode(log);
    assert_eq!(types_of(&messages), vec!["FMT", "ATT"]);
    assert_eq!(field_f64(&messages[1], "Pitch"), 2.0);
}

#[test]
fn test_duplicate_schema_keeps_first_definition() {
    let log = LogBuilder::new()
        .schema(11, ATT_LEN, "ATT", "Qff", "TimeUS,Roll,Pitch")
        .schema(11, 3 + 9, "XXX", "QB", "TimeUS,Flag")
        .record(11, &att_payload(5, 0.5, 0.5))
        .build();

    let mut reader = SequentialReader::from_bytes(log, DecoderConfig::default()).unwrap();
    let messages = reader.parse_all();

    // both schema records are acknowledged, only the first one is used
    assert_eq!(types_of(&messages), vec!["FMT", "FMT", "ATT"]);
    assert_eq!(field_str(&messages[1], "Name"), "XXX");
    assert_eq!(reader.schemas().len(), 1);
    assert_eq!(reader.schemas().get(11).map(|s| s.name()), Some("ATT"));
}

#[test]
fn test_truncated_trailing_record() {
    let mut log = sample_flight(2);
    let full = decode(log.clone()).len();
    log.truncate(log.len() - 1);
    assert_eq!(decode(log).len(), full - 1);
}

#[test]
fn test_filter_include() {
    let reader = SequentialReader::from_bytes(sample_flight(10), DecoderConfig::default())
        .unwrap()
        .with_filter(TypeFilter::include(["GPS"]));
    let messages: Vec<_> = reader.collect();
    assert_eq!(messages.len(), 10);
    assert!(messages.iter().all(|m| m.msg_type() == "GPS"));
}

#[test]
fn test_filter_regex_and_exclude() {
    let regex = SequentialReader::from_bytes(sample_flight(10), DecoderConfig::default())
        .unwrap()
        .with_filter(TypeFilter::regex_include("^(FMT|MSG)$").unwrap())
        .parse_all();
    assert_eq!(regex.len(), 3 + 2);

    let exclude = SequentialReader::from_bytes(sample_flight(10), DecoderConfig::default())
        .unwrap()
        .with_filter(TypeFilter::exclude(["FMT", "ATT"]))
        .parse_all();
    assert_eq!(types_of(&exclude).iter().filter(|t| **t == "GPS").count(), 10);
    assert!(exclude.iter().all(|m| m.msg_type() != "FMT"));
}

#[test]
fn test_raw_data_column_and_strings() {
    let mut payload = b"PARM".to_vec();
    payload.extend_from_slice(&padded(b"\x01\x00\x02", 16));
    let log = LogBuilder::new()
        .schema(20, 3 + 20, "BLOB", "nN", "Tag,Data")
        .record(20, &payload)
        .build();

    let messages = decode(log);
    let blob = &messages[1];
    assert_eq!(field_str(blob, "Tag"), "PARM");
    let data = blob.get("Data").and_then(CodecValue::as_bytes).unwrap();
    assert_eq!(data.len(), 16);
    assert_eq!(&data[..3], b"\x01\x00\x02");
}

#[test]
fn test_rounding_toggle_keeps_gps_altitude_rule() {
    let log = LogBuilder::new()
        .schema(10, GPS_LEN, "GPS", "QBLLdc", "TimeUS,Status,Lat,Lng,Alt,Spd")
        .schema(11, ATT_LEN, "ATT", "Qff", "TimeUS,Roll,Pitch")
        .record(10, &gps_payload(1, 3, 0, 0, 100.123456789, 0))
        .record(11, &att_payload(1, 0.1, 0.0))
        .build();

    let rounded = decode(log.clone());
    assert_eq!(field_f64(&rounded[2], "Alt"), 100.1234568);
    assert_eq!(field_f64(&rounded[3], "Roll"), 0.1);

    let config = DecoderConfig {
        rounding_enabled: false,
        ..DecoderConfig::default()
    };
    let raw = SequentialReader::from_bytes(log, config).unwrap().parse_all();
    assert_eq!(field_f64(&raw[2], "Alt"), 100.1234568);
    assert_eq!(field_f64(&raw[3], "Roll"), 0.1f32 as f64);
}

#[test]
fn test_custom_framing_config() {
    let config = DecoderConfig::from_toml_str(
        r#"
        sync_marker = "55aa"

        [format_codes]
        w = "uint16"
        "#,
    )
    .unwrap();

    // Same layout, different sync marker
    let mut log = schema_record(30, 5, "VOLT", "w", "Millis");
    log[..2].copy_from_slice(&[0x55, 0xAA]);
    log.extend_from_slice(&[0x55, 0xAA, 30, 0x10, 0x27]);
    log.extend_from_slice(&[0xA3, 0x95, 30, 0xFF, 0xFF]);

    let messages = SequentialReader::from_bytes(log, config).unwrap().parse_all();
    assert_eq!(types_of(&messages), vec!["FMT", "VOLT"]);
    assert_eq!(messages[1].get("Millis"), Some(&CodecValue::UInt16(10_000)));
}

#[test]
fn test_open_file_and_cancel() {
    let log = TempLog::new("sequential_open", &sample_flight(5));
    let mut reader = SequentialReader::open(&log.path).unwrap();
    assert_eq!(reader.path(), Some(log.path_str()));
    assert_eq!(reader.file_size(), sample_flight(5).len());

    let token = CancelToken::new();
    let first = reader.next_message().unwrap();
    assert_eq!(first.msg_type(), "FMT");

    let mut reader = reader.with_cancel(token.clone());
    token.cancel();
    assert!(reader.next_message().is_none());
    assert_eq!(reader.message_count(), 1);
}

#[test]
fn test_summarize_counts_records() {
    let info = SequentialReader::from_bytes(sample_flight(20), DecoderConfig::default())
        .unwrap()
        .summarize();

    assert_eq!(info.schema_records, 3);
    assert_eq!(info.data_records, 20 + 20 + 4);
    assert_eq!(info.unframed_bytes, 3 * 2);
    assert_eq!(info.type_by_name("MSG").map(|t| t.records), Some(4));
    assert_eq!(info.type_by_name("GPS").map(|t| t.record_len), Some(GPS_LEN as usize));
}

#[test]
fn test_fixture_lengths_match_payloads() {
    let gps = gps_payload(0, 0, 0, 0, 0.0, 0);
    let att = att_payload(0, 0.0, 0.0);
    let msg = msg_payload(0, "");
    assert_eq!(gps.len() + 3, GPS_LEN as usize);
    assert_eq!(att.len() + 3, ATT_LEN as usize);
    assert_eq!(msg.len() + 3, MSG_LEN as usize);

    let messages = SequentialReader::from_bytes(sample_flight(10), DecoderConfig::default())
        .unwrap()
        .parse_all();
    assert_eq!(messages.iter().filter(|m| m.msg_type() == "ATT").count(), 10);
    assert_eq!(messages.iter().filter(|m| m.msg_type() == "GPS").count(), 10);
}
