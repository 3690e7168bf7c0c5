//! Integration tests for configuration loading and validation

#![allow(clippy::expect_used)]

use tns_wire::config::{
    BufferConfig, DecodeConfig, LoggingConfig, TraceConfig, WireConfig, DEFAULT_BUFFER_CAPACITY,
    MAX_BUFFER_CAPACITY,
};
use tns_wire::Utf8Mode;
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = WireConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
    assert_eq!(config.buffer.initial_capacity, DEFAULT_BUFFER_CAPACITY);
    assert!(config.buffer.growable);
    assert_eq!(config.decode.key_utf8, Utf8Mode::Strict);
    assert!(!config.trace.trace_packets);
}

#[test]
fn test_zero_buffer_capacity() {
    let mut config = WireConfig::default();
    config.buffer.initial_capacity = 0;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Buffer capacity must be greater than 0")));
}

#[test]
fn test_excessive_buffer_capacity() {
    let mut config = WireConfig::default();
    config.buffer.initial_capacity = MAX_BUFFER_CAPACITY + 1;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Buffer capacity too large")));
}

#[test]
fn test_zero_hex_dump_width() {
    let mut config = WireConfig::default();
    config.trace.hex_dump_width = 0;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Hex dump width must be greater than 0")));
}

#[test]
fn test_wide_hex_dump_width() {
    let mut config = WireConfig::default();
    config.trace.hex_dump_width = 65;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Hex dump width too large")));
}

#[test]
fn test_empty_app_name() {
    let mut config = WireConfig::default();
    config.logging.app_name = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_long_app_name() {
    let mut config = WireConfig::default();
    config.logging.app_name = "a".repeat(65);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Application name too long")));
}

#[test]
fn test_validate_strict_with_valid_config() {
    assert!(WireConfig::default().validate_strict().is_ok());
}

#[test]
fn test_validate_strict_with_invalid_config() {
    let mut config = WireConfig::default();
    config.buffer.initial_capacity = 0;

    let err = config.validate_strict().expect_err("invalid config");
    let message = err.to_string();
    assert!(message.contains("Configuration validation failed"));
    assert!(message.contains("Buffer capacity must be greater than 0"));
}

#[test]
fn test_multiple_validation_errors() {
    let config = WireConfig {
        buffer: BufferConfig {
            initial_capacity: 0,
            growable: false,
        },
        decode: DecodeConfig::default(),
        trace: TraceConfig {
            trace_packets: true,
            hex_dump_width: 0,
            record_captures: false,
        },
        logging: LoggingConfig {
            app_name: String::new(),
            log_level: Level::DEBUG,
            json_format: false,
        },
    };

    let errors = config.validate();
    assert_eq!(errors.len(), 3, "errors: {errors:?}");
}

#[test]
fn test_partial_toml_uses_defaults() {
    let config = WireConfig::from_toml(
        r#"
        [buffer]
        initial_capacity = 512
        growable = false

        [decode]
        key_utf8 = "lossy"
        "#,
    )
    .expect("parse");

    assert_eq!(config.buffer.initial_capacity, 512);
    assert!(!config.buffer.growable);
    assert_eq!(config.decode.key_mode(), Utf8Mode::Lossy);
    assert_eq!(config.trace.hex_dump_width, 8);
    assert_eq!(config.logging.log_level, Level::INFO);
}

#[test]
fn test_log_level_parsing() {
    let config = WireConfig::from_toml(
        r#"
        [logging]
        app_name = "capture-diff"
        log_level = "trace"
        json_format = true
        "#,
    )
    .expect("parse");
    assert_eq!(config.logging.log_level, Level::TRACE);
    assert!(config.logging.json_format);

    let bad = WireConfig::from_toml(
        r#"
        [logging]
        app_name = "x"
        log_level = "loud"
        json_format = false
        "#,
    );
    assert!(bad.is_err());
}

#[test]
fn test_malformed_toml_rejected() {
    assert!(WireConfig::from_toml("[buffer\ninitial_capacity = ").is_err());
}

#[test]
fn test_example_config_parses_back() {
    let text = WireConfig::example_config();
    let parsed = WireConfig::from_toml(&text).expect("example config parses");
    assert_eq!(parsed.buffer.initial_capacity, DEFAULT_BUFFER_CAPACITY);
    assert!(parsed.validate().is_empty());
}

#[test]
fn test_save_and_load_file() {
    let path = std::env::temp_dir().join(format!("tns-wire-config-{}.toml", std::process::id()));

    let config = WireConfig::default_with_overrides(|c| {
        c.trace.trace_packets = true;
        c.trace.hex_dump_width = 16;
        c.logging.log_level = Level::WARN;
    });
    config.save_to_file(&path).expect("save");

    let loaded = WireConfig::from_file(&path).expect("load");
    std::fs::remove_file(&path).ok();

    assert!(loaded.trace.trace_packets);
    assert_eq!(loaded.trace.hex_dump_width, 16);
    assert_eq!(loaded.logging.log_level, Level::WARN);
}

#[test]
fn test_missing_file_is_config_error() {
    let err = WireConfig::from_file("/nonexistent/tns-wire.toml").expect_err("missing file");
    assert!(err.to_string().contains("Failed to open config file"));
}
