//! Process-wide logger lifecycle and caller-facing message builders.

pub mod handle;
pub mod stream;

pub use handle::{log, ProcessLogHandle, TeardownGuard};
pub use stream::LogStream;
