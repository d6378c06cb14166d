//! # Prometheus Async Log
//!
//! A blocking FIFO queue and the single-consumer asynchronous logger built on it.
//!
//! Logging from latency-sensitive threads (UI event handlers, decode loops,
//! annotation tools) should never wait on a terminal or a pipe. This crate moves
//! the write off the caller: `log` enqueues the text and returns immediately,
//! and one dedicated consumer thread writes messages to the sink in the order
//! they were enqueued.
//!
//! ## Key Features
//!
//! - **`BlockingQueue<T>`**: Unbounded thread-safe FIFO with blocking and non-blocking pop
//! - **`LogWorker`**: One consumer thread per worker, fire-and-forget `log`
//! - **Strict drain on shutdown**: Sentinel + acknowledgement, no busy-waiting
//! - **Process-wide handle**: Lazily started on first use, torn down by a guard
//! - **Never fails the caller**: Sink errors are counted, not propagated
//!
//! ## Process-wide logging
//!
//! ```rust,no_run
//! use prometheus_async_log::log_line;
//! use prometheus_async_log::runtime::{LogStream, ProcessLogHandle};
//!
//! let _teardown = ProcessLogHandle::teardown_guard();
//!
//! log_line!("opened {}", "traffic.mp4");
//! LogStream::new().push("frame ").push(120).push(" annotated");
//! ```
//!
//! ## Dedicated worker
//!
//! ```rust
//! use prometheus_async_log::core::{LogWorker, MemorySink};
//!
//! let sink = MemorySink::new();
//! let worker = LogWorker::new(sink.clone()).unwrap();
//! worker.log("hello\n");
//! worker.shutdown();
//! assert_eq!(sink.contents(), "hello\n");
//! ```

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Blocking queue, log worker, sinks and errors.
pub mod core;
/// Configuration models for the log worker.
pub mod config;
/// Process-wide handle and message builders.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::config::LoggerConfig;
pub use crate::core::{BlockingQueue, LogWorker, LoggerError, Message};
pub use crate::runtime::{log, LogStream, ProcessLogHandle};
