//! Process-wide log handle.
//!
//! [`ProcessLogHandle::instance`] lazily starts a single [`LogWorker`] writing
//! to standard output the first time any thread asks for it. Every later call,
//! from any thread, returns the same handle.
//!
//! Rust never runs destructors for statics, so the drain-and-join teardown is
//! tied to a [`TeardownGuard`] held by `main`:
//!
//! ```no_run
//! use prometheus_async_log::runtime::{self, ProcessLogHandle};
//!
//! fn main() {
//!     let _teardown = ProcessLogHandle::teardown_guard();
//!
//!     runtime::log("application started\n");
//!     // ... pending messages are flushed when `_teardown` drops
//! }
//! ```

use std::fmt;
use std::sync::OnceLock;

use tracing::error;

use crate::config::LoggerConfig;
use crate::core::{LogSink, LogWorker, Message, ShutdownReport, StdoutSink};

static INSTANCE: OnceLock<ProcessLogHandle> = OnceLock::new();

/// The single process-wide logger.
pub struct ProcessLogHandle {
    /// `None` when the consumer thread could not be started; logging is then a no-op.
    worker: Option<LogWorker>,
}

impl ProcessLogHandle {
    /// Returns the process-wide handle, starting its worker on first use.
    pub fn instance() -> &'static Self {
        INSTANCE.get_or_init(|| Self::start(LoggerConfig::default(), StdoutSink::new()))
    }

    /// Returns the handle only if some thread has already initialized it.
    pub fn get() -> Option<&'static Self> {
        INSTANCE.get()
    }

    /// Guard that drains and stops the process-wide worker when dropped.
    #[must_use = "the worker is torn down when the guard is dropped"]
    pub const fn teardown_guard() -> TeardownGuard {
        TeardownGuard { _private: () }
    }

    fn start<S>(config: LoggerConfig, sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        match LogWorker::with_config(config, sink) {
            Ok(worker) => Self {
                worker: Some(worker),
            },
            Err(e) => {
                error!(error = %e, "process log worker unavailable, messages will be dropped");
                Self { worker: None }
            }
        }
    }

    /// Enqueue `message`; fire-and-forget.
    pub fn log(&self, message: impl Into<Message>) {
        if let Some(worker) = &self.worker {
            worker.log(message);
        }
    }

    /// The underlying worker, if it started.
    #[must_use]
    pub const fn worker(&self) -> Option<&LogWorker> {
        self.worker.as_ref()
    }

    fn teardown(&self) -> Option<ShutdownReport> {
        self.worker.as_ref().and_then(LogWorker::shutdown)
    }
}

impl fmt::Debug for ProcessLogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessLogHandle")
            .field("worker", &self.worker)
            .finish()
    }
}

/// Runs the Draining → Stopped sequence on the process-wide worker when dropped.
///
/// Does nothing if the handle was never initialized.
#[derive(Debug)]
pub struct TeardownGuard {
    _private: (),
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        if let Some(handle) = ProcessLogHandle::get() {
            handle.teardown();
        }
    }
}

/// Log `message` through the process-wide handle.
pub fn log(message: impl Into<Message>) {
    ProcessLogHandle::instance().log(message);
}
