//! Single-consumer asynchronous log worker.
//!
//! A [`LogWorker`] owns one [`BlockingQueue`] and one background thread. Any
//! thread may call [`LogWorker::log`]; the consumer thread pops messages in
//! arrival order and writes them to its [`LogSink`].
//!
//! # Lifecycle
//!
//! `Created → Running → Draining → Stopped`
//!
//! Shutdown sets the done flag and enqueues a sentinel carrying an
//! acknowledgement channel in one step under the queue lock; `log` checks the
//! flag under the same lock. Every accepted message therefore sits ahead of
//! the sentinel, and FIFO order means all of them have been written by the
//! time the consumer reaches it. The consumer flushes the sink, acknowledges
//! and exits; the shutdown caller waits for the acknowledgement (bounded by
//! the configured timeout) and joins the thread. No polling is involved.
//!
//! If the consumer thread dies early (a panicking sink), it clears its alive
//! flag and drops everything still queued on the way out. Later `log` calls
//! are discarded, and shutdown sees the acknowledgement channel disconnect at
//! once instead of waiting out the timeout.
//!
//! # Examples
//!
//! ```
//! use prometheus_async_log::core::{LogWorker, MemorySink};
//!
//! let sink = MemorySink::new();
//! let worker = LogWorker::new(sink.clone()).unwrap();
//!
//! worker.log("first\n");
//! worker.log(String::from("second\n"));
//! worker.shutdown();
//!
//! assert_eq!(sink.contents(), "first\nsecond\n");
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::LoggerConfig;
use crate::core::{BlockingQueue, LogSink, LoggerError, Message};

/// Lifecycle state of a [`LogWorker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Constructed, consumer thread not yet running.
    Created = 0,
    /// Accepting and writing messages.
    Running = 1,
    /// Shutdown requested; pending messages are being flushed.
    Draining = 2,
    /// Consumer thread has exited or been detached.
    Stopped = 3,
}

impl WorkerState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Created,
            1 => Self::Running,
            2 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// Counters describing what a worker has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Messages accepted by `log`.
    pub enqueued: u64,
    /// Messages handed to the sink (including failed writes).
    pub written: u64,
    /// Messages dropped because shutdown had begun or the consumer was gone.
    pub discarded: u64,
    /// Sink writes or flushes that returned an error.
    pub write_errors: u64,
}

/// Outcome of the first call to [`LogWorker::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Total messages handed to the sink over the worker's life.
    pub written: u64,
    /// Messages dropped instead of written.
    pub discarded: u64,
    /// Whether the consumer failed to acknowledge in time and was detached.
    pub timed_out: bool,
}

/// Queue item: a message, or the shutdown sentinel.
enum Envelope {
    Line(Message),
    Shutdown(Sender<u64>),
}

#[derive(Debug, Default)]
struct WorkerCounters {
    enqueued: AtomicU64,
    written: AtomicU64,
    discarded: AtomicU64,
    write_errors: AtomicU64,
}

impl WorkerCounters {
    fn snapshot(&self) -> WorkerStats {
        WorkerStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

/// State shared between the worker handle and its consumer thread.
struct Shared {
    queue: BlockingQueue<Envelope>,
    /// Set once by shutdown, never cleared.
    done: AtomicBool,
    /// Cleared once when the consumer thread exits, by return or by panic.
    consumer_alive: AtomicBool,
    state: AtomicU8,
    counters: WorkerCounters,
}

impl Shared {
    fn accepting(&self) -> bool {
        !self.done.load(Ordering::Acquire) && self.consumer_alive.load(Ordering::Acquire)
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn write(&self, sink: &mut impl LogSink, message: &Message) {
        if let Err(e) = sink.write(message.as_str()) {
            self.counters.write_errors.fetch_add(1, Ordering::Relaxed);
            debug!(error = %e, "log sink write failed");
        }
        self.counters.written.fetch_add(1, Ordering::Relaxed);
    }
}

/// Marks the consumer gone when the consumer thread unwinds or returns.
///
/// The flag is cleared before the queue is emptied, and pushes check it under
/// the queue lock, so nothing can be left behind the drain.
struct ConsumerExit<'a>(&'a Shared);

impl Drop for ConsumerExit<'_> {
    fn drop(&mut self) {
        self.0.consumer_alive.store(false, Ordering::Release);
        let stranded = self
            .0
            .queue
            .drain()
            .into_iter()
            .filter(|envelope| matches!(envelope, Envelope::Line(_)))
            .count();
        if stranded > 0 {
            let stranded = u64::try_from(stranded).unwrap_or(u64::MAX);
            self.0.counters.discarded.fetch_add(stranded, Ordering::Relaxed);
        }
    }
}

/// Asynchronous logger backed by one consumer thread.
///
/// Not `Clone`: it owns a thread and a queue. Share it by reference or `Arc`.
/// Dropping the worker runs [`shutdown`](Self::shutdown).
pub struct LogWorker {
    id: Uuid,
    config: LoggerConfig,
    shared: Arc<Shared>,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl LogWorker {
    /// Start a worker with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `LoggerError::Spawn` if the consumer thread cannot be created.
    pub fn new<S>(sink: S) -> Result<Self, LoggerError>
    where
        S: LogSink + 'static,
    {
        Self::with_config(LoggerConfig::default(), sink)
    }

    /// Start a worker with an explicit configuration.
    ///
    /// # Errors
    ///
    /// - `LoggerError::InvalidConfig` if the configuration is invalid
    /// - `LoggerError::Spawn` if the consumer thread cannot be created
    pub fn with_config<S>(config: LoggerConfig, sink: S) -> Result<Self, LoggerError>
    where
        S: LogSink + 'static,
    {
        config.validate().map_err(LoggerError::InvalidConfig)?;

        let id = Uuid::new_v4();
        let shared = Arc::new(Shared {
            queue: BlockingQueue::new(),
            done: AtomicBool::new(false),
            consumer_alive: AtomicBool::new(true),
            state: AtomicU8::new(WorkerState::Created as u8),
            counters: WorkerCounters::default(),
        });

        let consumer = spawn_consumer(id, &config, Arc::clone(&shared), sink)?;
        shared.set_state(WorkerState::Running);

        info!(
            worker_id = %id,
            thread_name = %config.thread_name,
            "log worker started"
        );

        Ok(Self {
            id,
            config,
            shared,
            consumer: Mutex::new(Some(consumer)),
        })
    }

    /// Enqueue `message` for the consumer thread and return immediately.
    ///
    /// Never blocks beyond brief lock contention and never reports failure.
    /// Messages arriving after shutdown began, or after the consumer thread
    /// died, are discarded.
    pub fn log(&self, message: impl Into<Message>) {
        let shared = &*self.shared;
        let admitted = shared
            .queue
            .push_if(Envelope::Line(message.into()), || shared.accepting());

        if admitted.is_ok() {
            shared.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        } else {
            shared.counters.discarded.fetch_add(1, Ordering::Relaxed);
            trace!(worker_id = %self.id, "message discarded");
        }
    }

    /// Drain pending messages, stop the consumer thread and join it.
    ///
    /// Every message accepted by `log` before this call is written before the
    /// consumer exits, unless the consumer thread died first. Only the first
    /// call does anything; later calls return `None`.
    pub fn shutdown(&self) -> Option<ShutdownReport> {
        let (ack_tx, ack_rx) = bounded(1);
        let shared = &*self.shared;
        let mut first = false;
        // A rejected sentinel drops its sender, so a dead consumer shows up
        // below as a disconnect.
        let _ = shared.queue.push_if(Envelope::Shutdown(ack_tx), || {
            first = !shared.done.swap(true, Ordering::AcqRel);
            first && shared.consumer_alive.load(Ordering::Acquire)
        });
        if !first {
            return None;
        }
        self.shared.set_state(WorkerState::Draining);
        debug!(worker_id = %self.id, pending = self.pending(), "log worker draining");

        let consumer = self.consumer.lock().take();
        let timeout = self.config.shutdown_timeout();
        let mut timed_out = false;

        match ack_rx.recv_timeout(timeout) {
            Ok(written) => {
                debug!(worker_id = %self.id, written, "log worker acknowledged drain");
                join_consumer(self.id, consumer);
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(worker_id = %self.id, "log worker exited without acknowledging drain");
                join_consumer(self.id, consumer);
            }
            Err(RecvTimeoutError::Timeout) => {
                timed_out = true;
                warn!(
                    worker_id = %self.id,
                    timeout_ms = self.config.shutdown_timeout_ms,
                    "log worker did not drain within timeout - detaching"
                );
            }
        }

        self.shared.set_state(WorkerState::Stopped);
        let stats = self.stats();
        info!(
            worker_id = %self.id,
            written = stats.written,
            discarded = stats.discarded,
            "log worker stopped"
        );

        Some(ShutdownReport {
            written: stats.written,
            discarded: stats.discarded,
            timed_out,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Messages waiting for the consumer.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.queue.size()
    }

    /// Snapshot of the worker's counters.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        self.shared.counters.snapshot()
    }

    /// Identifier used in this worker's diagnostics.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Configuration the worker was started with.
    #[must_use]
    pub const fn config(&self) -> &LoggerConfig {
        &self.config
    }
}

impl Drop for LogWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for LogWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogWorker")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

fn spawn_consumer<S>(
    id: Uuid,
    config: &LoggerConfig,
    shared: Arc<Shared>,
    mut sink: S,
) -> Result<JoinHandle<()>, LoggerError>
where
    S: LogSink + 'static,
{
    let mut builder = thread::Builder::new().name(config.thread_name.clone());
    if let Some(size) = config.stack_size {
        builder = builder.stack_size(size);
    }

    let handle = builder.spawn(move || {
        let _exit = ConsumerExit(&shared);
        debug!(worker_id = %id, "log consumer thread started");

        loop {
            match shared.queue.wait_and_pop() {
                Envelope::Line(message) => shared.write(&mut sink, &message),
                Envelope::Shutdown(ack) => {
                    debug_assert!(shared.done.load(Ordering::Acquire));
                    debug_assert!(shared.queue.empty());
                    if let Err(e) = sink.flush() {
                        shared.counters.write_errors.fetch_add(1, Ordering::Relaxed);
                        debug!(error = %e, "log sink flush failed");
                    }
                    let _ = ack.send(shared.counters.written.load(Ordering::Relaxed));
                    break;
                }
            }
        }

        debug!(worker_id = %id, "log consumer thread exiting");
    })?;

    Ok(handle)
}

fn join_consumer(id: Uuid, consumer: Option<JoinHandle<()>>) {
    let Some(consumer) = consumer else {
        return;
    };
    if consumer.join().is_err() {
        warn!(worker_id = %id, "log consumer thread panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemorySink;
    use std::io;
    use std::time::{Duration, Instant};

    /// Sink that blocks every write until released.
    struct GatedSink {
        gate: Arc<(parking_lot::Mutex<bool>, parking_lot::Condvar)>,
        inner: MemorySink,
    }

    impl LogSink for GatedSink {
        fn write(&mut self, text: &str) -> io::Result<()> {
            let (lock, cvar) = &*self.gate;
            let mut open = lock.lock();
            while !*open {
                cvar.wait(&mut open);
            }
            self.inner.write(text)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenSink;

    struct PanickingSink;

    impl LogSink for PanickingSink {
        fn write(&mut self, _text: &str) -> io::Result<()> {
            panic!("sink failure");
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogSink for BrokenSink {
        fn write(&mut self, _text: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }
    }

    #[test]
    fn test_worker_writes_in_order() {
        let sink = MemorySink::new();
        let worker = LogWorker::new(sink.clone()).unwrap();
        assert_eq!(worker.state(), WorkerState::Running);

        for i in 0..100 {
            worker.log(format!("line {i}\n"));
        }
        let report = worker.shutdown().unwrap();

        assert_eq!(report.written, 100);
        assert!(!report.timed_out);
        let expected: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        assert_eq!(sink.lines(), expected);
        assert_eq!(worker.state(), WorkerState::Stopped);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let worker = LogWorker::new(MemorySink::new()).unwrap();
        assert!(worker.shutdown().is_some());
        assert!(worker.shutdown().is_none());
    }

    #[test]
    fn test_log_after_shutdown_is_discarded() {
        let sink = MemorySink::new();
        let worker = LogWorker::new(sink.clone()).unwrap();
        worker.shutdown();

        worker.log("too late\n");

        assert_eq!(sink.contents(), "");
        let stats = worker.stats();
        assert_eq!(stats.discarded, 1);
        assert_eq!(stats.enqueued, 0);
    }

    #[test]
    fn test_sink_errors_are_suppressed_and_counted() {
        let worker = LogWorker::new(BrokenSink).unwrap();
        worker.log("a\n");
        worker.log("b\n");
        let report = worker.shutdown().unwrap();

        assert_eq!(report.written, 2);
        // two failed writes plus the failed final flush
        assert_eq!(worker.stats().write_errors, 3);
    }

    #[test]
    fn test_shutdown_drains_backlog_behind_slow_sink() {
        let gate = Arc::new((parking_lot::Mutex::new(false), parking_lot::Condvar::new()));
        let sink = MemorySink::new();
        let worker = LogWorker::new(GatedSink {
            gate: Arc::clone(&gate),
            inner: sink.clone(),
        })
        .unwrap();

        for i in 0..50 {
            worker.log(format!("{i}\n"));
        }

        let opener = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                let (lock, cvar) = &*gate;
                *lock.lock() = true;
                cvar.notify_all();
            })
        };

        let report = worker.shutdown().unwrap();
        opener.join().unwrap();

        assert_eq!(report.written, 50);
        assert_eq!(sink.lines().len(), 50);
    }

    #[test]
    fn test_shutdown_times_out_and_detaches() {
        let gate = Arc::new((parking_lot::Mutex::new(false), parking_lot::Condvar::new()));
        let config = LoggerConfig::new().with_shutdown_timeout(Duration::from_millis(50));
        let worker = LogWorker::with_config(
            config,
            GatedSink {
                gate: Arc::clone(&gate),
                inner: MemorySink::new(),
            },
        )
        .unwrap();

        worker.log("stuck\n");
        let start = Instant::now();
        let report = worker.shutdown().unwrap();

        assert!(report.timed_out);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(worker.state(), WorkerState::Stopped);

        // release the detached consumer so it can exit
        let (lock, cvar) = &*gate;
        *lock.lock() = true;
        cvar.notify_all();
    }

    #[test]
    fn test_dead_consumer_shuts_down_promptly() {
        let worker = LogWorker::new(PanickingSink).unwrap();
        worker.log("boom\n");

        // wait until the consumer has died and log starts refusing
        let mut refused = false;
        for _ in 0..400 {
            worker.log("after\n");
            if worker.stats().discarded > 0 {
                refused = true;
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(refused);

        let start = Instant::now();
        let report = worker.shutdown().unwrap();

        assert!(!report.timed_out);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(report.written, 0);
        assert_eq!(worker.state(), WorkerState::Stopped);

        let discarded = worker.stats().discarded;
        worker.log("late\n");
        assert_eq!(worker.stats().discarded, discarded + 1);
        assert!(worker.shutdown().is_none());
    }

    #[test]
    fn test_consumer_death_during_shutdown_is_not_a_timeout() {
        let worker = LogWorker::new(PanickingSink).unwrap();
        for i in 0..20 {
            worker.log(format!("{i}\n"));
        }

        let start = Instant::now();
        let report = worker.shutdown().unwrap();

        assert!(!report.timed_out);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(worker.state(), WorkerState::Stopped);
        let stats = worker.stats();
        assert_eq!(stats.written, 0);
        // the first line died in the sink; the rest were refused or dropped with the queue
        assert_eq!(stats.discarded, 19);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LoggerConfig::new().with_thread_name("");
        let err = LogWorker::with_config(config, MemorySink::new()).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfig(_)));
    }

    #[test]
    fn test_consumer_thread_is_named() {
        struct NameSink(Arc<parking_lot::Mutex<Option<String>>>);

        impl LogSink for NameSink {
            fn write(&mut self, _text: &str) -> io::Result<()> {
                *self.0.lock() = thread::current().name().map(str::to_owned);
                Ok(())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let seen = Arc::new(parking_lot::Mutex::new(None));
        let config = LoggerConfig::new().with_thread_name("annotator-log");
        let worker = LogWorker::with_config(config, NameSink(Arc::clone(&seen))).unwrap();
        worker.log("x\n");
        worker.shutdown();

        assert_eq!(seen.lock().as_deref(), Some("annotator-log"));
    }

    #[test]
    fn test_drop_runs_shutdown() {
        let sink = MemorySink::new();
        {
            let worker = LogWorker::new(sink.clone()).unwrap();
            worker.log("before drop\n");
        }
        assert_eq!(sink.contents(), "before drop\n");
    }
}
