//! Output sinks for the log worker.
//!
//! A sink is owned by the consumer thread for its whole life, so
//! implementations only need `Send`.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Destination for message text.
pub trait LogSink: Send {
    /// Writes `text` verbatim. The worker adds nothing to it.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; the worker counts it and moves on.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn flush(&mut self) -> io::Result<()>;
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        (**self).write(text)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Standard output sink.
///
/// Each message goes out under a single stdout lock, so concurrent writers in
/// the same process never split it.
#[derive(Debug)]
pub struct StdoutSink {
    stdout: io::Stdout,
}

impl StdoutSink {
    /// Creates a sink writing to the process's standard output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StdoutSink {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.stdout.lock().write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

/// Adapter turning any [`Write`] into a sink.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// In-memory sink whose contents stay readable from other threads.
///
/// Clones share the same buffer: hand one clone to the worker and keep
/// another to inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<String>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Written text split into lines, terminators stripped.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.buffer.lock().lines().map(str::to_owned).collect()
    }
}

impl LogSink for MemorySink {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.buffer.lock().push_str(text);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
