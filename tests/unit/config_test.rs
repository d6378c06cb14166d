//! Tests for logger configuration

use prometheus_async_log::config::{LoggerConfig, MIN_STACK_SIZE};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_config_roundtrips_through_json() {
    let cfg = LoggerConfig::new()
        .with_thread_name("labelimg-log")
        .with_stack_size(MIN_STACK_SIZE * 4)
        .with_shutdown_timeout(Duration::from_secs(2));

    let json = serde_json::to_string(&cfg).unwrap();
    let parsed = LoggerConfig::from_json_str(&json).unwrap();
    assert_eq!(parsed, cfg);
}

#[test]
fn test_stack_size_boundary() {
    assert!(LoggerConfig::new().with_stack_size(MIN_STACK_SIZE).validate().is_ok());
    let err = LoggerConfig::new()
        .with_stack_size(MIN_STACK_SIZE - 1)
        .validate()
        .unwrap_err();
    assert_eq!(err, format!("stack_size must be at least {MIN_STACK_SIZE} bytes"));
}

#[test]
fn test_from_json_file() {
    let path = std::env::temp_dir().join(format!("async-log-config-{}.json", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{ "thread_name": "file-log", "shutdown_timeout_ms": 750 }}"#).unwrap();
    }

    let cfg = LoggerConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(cfg.thread_name, "file-log");
    assert_eq!(cfg.shutdown_timeout(), Duration::from_millis(750));
}

#[test]
fn test_from_json_file_missing() {
    let err = LoggerConfig::from_json_file("/definitely/not/here/logger.json").unwrap_err();
    assert!(err.to_string().starts_with("reading logger config"));
}

#[test]
fn test_from_json_file_invalid_values() {
    let path = std::env::temp_dir().join(format!("async-log-bad-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "thread_name": "" }"#).unwrap();

    let err = LoggerConfig::from_json_file(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();

    assert!(err.to_string().starts_with("loading logger config"));
    assert_eq!(err.root_cause().to_string(), "thread_name must not be empty");
}
