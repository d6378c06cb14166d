//! Configuration models for the log worker.

pub mod logger;

pub use logger::{LoggerConfig, MIN_STACK_SIZE};
