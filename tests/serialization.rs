//! Integration tests for export formats
//!
//! Decoded auth messages and comparison reports are exported as Bincode
//! (default) or JSON so they can be diffed against another implementation's
//! output.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::uninlined_format_args
)]

use tns_wire::core::serialization::{ExportFormat, MultiFormat};
use tns_wire::{compare_captures, AuthMessage, ComparisonReport, KeyValuePair, WireError};

fn sample_message() -> AuthMessage {
    AuthMessage::phase_one(
        "scott",
        vec![
            KeyValuePair::new("AUTH_TERMINAL", "pts/0", 0),
            KeyValuePair::new("AUTH_PROGRAM_NM", "capture-diff", 0),
            KeyValuePair::new("AUTH_ALTER_SESSION", "", 1),
        ],
    )
}

#[test]
fn test_bincode_export() {
    let message = sample_message();
    let bytes = message
        .serialize_format(ExportFormat::Bincode)
        .expect("Failed to serialize");
    let recovered = AuthMessage::deserialize_format(&bytes, ExportFormat::Bincode)
        .expect("Failed to deserialize");
    assert_eq!(message, recovered);
}

#[test]
fn test_json_export_is_readable() {
    let message = sample_message();
    let bytes = message
        .serialize_format(ExportFormat::Json)
        .expect("Failed to serialize");

    let json: serde_json::Value = serde_json::from_slice(&bytes).expect("valid JSON");
    assert_eq!(json["user"], "scott");
    assert_eq!(json["function_code"], 0x76);
    assert_eq!(json["pairs"][1]["value"], "capture-diff");
    assert_eq!(json["pairs"][2]["value_len"], 0);
}

#[test]
fn test_header_byte_selects_format() {
    let message = sample_message();
    for format in [ExportFormat::Bincode, ExportFormat::Json] {
        let bytes = message.serialize_with_header(format).unwrap();
        assert_eq!(bytes[0], format.format_byte());

        let (recovered, detected) = AuthMessage::deserialize_with_header(&bytes).unwrap();
        assert_eq!(detected, format, "format {}", format.name());
        assert_eq!(recovered, message);
    }
}

#[test]
fn test_unknown_header_byte_rejected() {
    let mut bytes = sample_message()
        .serialize_with_header(ExportFormat::Json)
        .unwrap();
    bytes[0] = 0x7F;
    assert!(matches!(
        AuthMessage::deserialize_with_header(&bytes),
        Err(WireError::DeserializeError(_))
    ));
    assert!(AuthMessage::deserialize_with_header(&[]).is_err());
}

#[test]
fn test_comparison_report_export() {
    let ours = sample_message().encode().unwrap();
    let mut theirs = ours.to_vec();
    let last = theirs.len() - 1;
    theirs[last] ^= 0x01;

    let report = compare_captures("rust", &ours, "reference", &theirs);
    let json = report.serialize_format(ExportFormat::Json).unwrap();
    let text = String::from_utf8(json.clone()).unwrap();
    assert!(text.contains("\"left_label\":\"rust\""));

    let recovered = ComparisonReport::deserialize_format(&json, ExportFormat::Json).unwrap();
    assert_eq!(recovered, report);
    assert_eq!(recovered.full.first_diff_offset(), Some(last));
}

#[test]
fn test_format_bytes_are_stable() {
    assert_eq!(ExportFormat::default(), ExportFormat::Bincode);
    assert_eq!(ExportFormat::from_byte(0x01), Some(ExportFormat::Bincode));
    assert_eq!(ExportFormat::from_byte(0x02), Some(ExportFormat::Json));
    assert_eq!(ExportFormat::from_byte(0x00), None);
}
