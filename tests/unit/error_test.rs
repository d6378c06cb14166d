//! Tests for error types

use prometheus_async_log::core::LogWorker;
use prometheus_async_log::core::MemorySink;
use prometheus_async_log::{LoggerConfig, LoggerError};

#[test]
fn test_invalid_config_error() {
    let err = LoggerError::InvalidConfig("thread_name must not be empty".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: thread_name must not be empty"
    );
}

#[test]
fn test_worker_reports_invalid_config() {
    let cfg = LoggerConfig::new().with_stack_size(1);
    match LogWorker::with_config(cfg, MemorySink::new()) {
        Err(LoggerError::InvalidConfig(msg)) => assert!(msg.contains("stack_size")),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}
