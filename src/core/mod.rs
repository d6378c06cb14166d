//! Blocking queue, log worker and their supporting types.

pub mod error;
pub mod message;
pub mod queue;
pub mod sink;
pub mod worker;

pub use error::{AppResult, LoggerError};
pub use message::Message;
pub use queue::BlockingQueue;
pub use sink::{LogSink, MemorySink, StdoutSink, WriterSink};
pub use worker::{LogWorker, ShutdownReport, WorkerState, WorkerStats};
