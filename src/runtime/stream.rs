//! Message builders on top of the enqueue API.
//!
//! [`LogStream`] collects displayable values and, when dropped, appends a
//! line terminator and enqueues the text as one message. [`log_line!`]
//! does the same from format arguments.
//!
//! ```
//! use prometheus_async_log::core::{LogWorker, MemorySink};
//! use prometheus_async_log::runtime::LogStream;
//!
//! let sink = MemorySink::new();
//! let worker = LogWorker::new(sink.clone()).unwrap();
//!
//! LogStream::to(&worker).push("frame ").push(42).push(" annotated");
//! worker.shutdown();
//!
//! assert_eq!(sink.contents(), "frame 42 annotated\n");
//! ```
//!
//! [`log_line!`]: crate::log_line

use std::fmt::{self, Write as _};

use crate::core::LogWorker;

enum Target<'a> {
    Process,
    Worker(&'a LogWorker),
}

/// One log line under construction.
pub struct LogStream<'a> {
    target: Target<'a>,
    buffer: String,
}

impl LogStream<'static> {
    /// A line that goes to the process-wide handle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            target: Target::Process,
            buffer: String::new(),
        }
    }
}

impl Default for LogStream<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> LogStream<'a> {
    /// A line that goes to `worker`.
    #[must_use]
    pub const fn to(worker: &'a LogWorker) -> Self {
        Self {
            target: Target::Worker(worker),
            buffer: String::new(),
        }
    }

    /// Append the display form of `value`.
    pub fn push(mut self, value: impl fmt::Display) -> Self {
        // writing into a String cannot fail
        let _ = write!(self.buffer, "{value}");
        self
    }
}

impl fmt::Write for LogStream<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buffer.push_str(s);
        Ok(())
    }
}

impl Drop for LogStream<'_> {
    fn drop(&mut self) {
        let mut text = std::mem::take(&mut self.buffer);
        text.push('\n');
        match self.target {
            Target::Process => super::log(text),
            Target::Worker(worker) => worker.log(text),
        }
    }
}

/// Format a line, append `'\n'` and log it.
///
/// `log_line!("...", args)` goes to the process-wide handle;
/// `log_line!(worker => "...", args)` goes to a specific [`LogWorker`].
///
/// [`LogWorker`]: crate::core::LogWorker
#[macro_export]
macro_rules! log_line {
    ($worker:expr => $($arg:tt)+) => {{
        let mut text = ::std::format!($($arg)+);
        text.push('\n');
        $worker.log(text);
    }};
    ($($arg:tt)+) => {{
        let mut text = ::std::format!($($arg)+);
        text.push('\n');
        $crate::runtime::log(text);
    }};
}
