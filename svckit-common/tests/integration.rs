//! Integration tests for svckit-common.

use std::io::Write;

use svckit_common::{Caller, Error, Level, LogRecord, LoggerConfig};

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{
            // comments are allowed in JSON5
            level: "error",
            json_format: true,
            service_name: "inventory",
        }}"#
    )
    .unwrap();

    let config = LoggerConfig::load_from_file(file.path()).expect("load config");

    assert_eq!(config.min_level(), Level::Error);
    assert!(config.json_format);
    assert_eq!(config.service_name, "inventory");
    assert!(!config.otel_enabled);
}

#[test]
fn test_load_config_missing_file() {
    let result = LoggerConfig::load_from_file("/definitely/not/here.json5");
    match result {
        Err(Error::Config(message)) => {
            assert!(message.contains("Failed to read"));
            assert!(message.contains("/definitely/not/here.json5"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_record_is_cloned_not_shared() {
    let record = LogRecord::builder(Level::Info, "a fairly long message")
        .caller(Caller::new("src/main.rs", 10))
        .build();
    let copy = record.clone();

    assert_eq!(record.display_message(6), "a fair");
    assert_eq!(copy.message(), "a fairly long message");
    assert_eq!(record, copy);
}

#[test]
fn test_every_level_parses_from_its_name() {
    for level in Level::ALL {
        assert_eq!(level.as_str().parse::<Level>(), Ok(level));
    }
}
