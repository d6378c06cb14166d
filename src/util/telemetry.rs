//! Tracing setup for the logger's own diagnostics.
//!
//! Worker lifecycle events (start, drain, stop, detach) are emitted through
//! `tracing`, never through the log queue itself.

/// Install a default env-filtered `fmt` subscriber if none is set.
///
/// Diagnostics go to stderr. The default sink, [`StdoutSink`], writes the
/// logged messages to stdout, and worker events must not interleave with them.
///
/// Applications that configure their own subscriber can skip this.
///
/// [`StdoutSink`]: crate::core::StdoutSink
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_repeatable() {
        init_tracing();
        init_tracing();
        assert!(tracing::dispatcher::has_been_set());
    }
}
