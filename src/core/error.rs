//! Error types for logger construction and configuration.
//!
//! The logging path itself never fails; these errors only surface while a
//! worker is being built.

use thiserror::Error;

/// Errors produced while configuring or starting a log worker.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Configuration values failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The consumer thread could not be spawned.
    #[error("failed to spawn log worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::WouldBlock, "no threads left");
        let err: LoggerError = io.into();
        assert!(matches!(err, LoggerError::Spawn(_)));
        assert_eq!(
            err.to_string(),
            "failed to spawn log worker thread: no threads left"
        );
    }
}
