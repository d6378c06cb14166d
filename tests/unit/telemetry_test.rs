//! Tests for telemetry helpers

use prometheus_async_log::util::init_tracing;

#[test]
fn test_init_tracing_installs_subscriber() {
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
}
