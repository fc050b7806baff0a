//! Unified error handling for the grid signal engine
//!
//! The signal computation itself is total; errors come from the edges
//! (configuration, price feeds, swap submission, transaction monitoring).

use std::io;
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for the engine and its collaborators
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid parameter '{0}': {1}")]
    InvalidParameter(String, String), // (parameter_name, reason)

    // Engine state
    #[error("Invalid engine state: {0}")]
    InvalidState(String),

    // Price feed errors
    #[error("Price feed connection error: {0}")]
    FeedConnection(String),

    #[error("Price feed returned malformed data: {0}")]
    FeedData(String),

    #[error("Price feed closed")]
    FeedClosed,

    // Execution errors
    #[error("Swap submission failed: {0}")]
    SwapFailed(String),

    #[error("Commitment check failed for {0}: {1}")]
    CommitmentCheck(String, String),

    #[error("Transaction {0} not finalized after {1} attempts")]
    RetriesExhausted(String, u32),

    #[error("Transaction {0} monitoring timed out")]
    MonitorTimeout(String),

    // IO errors
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File read error: {0}")]
    FileRead(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Check if the failed operation is worth repeating on the next interval
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::FeedConnection(_)
                | EngineError::FeedData(_)
                | EngineError::SwapFailed(_)
                | EngineError::CommitmentCheck(_, _)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            EngineError::Config(_) | EngineError::InvalidParameter(_, _) => "config",

            EngineError::InvalidState(_) => "engine",

            EngineError::FeedConnection(_)
            | EngineError::FeedData(_)
            | EngineError::FeedClosed => "feed",

            EngineError::SwapFailed(_) => "execution",

            EngineError::CommitmentCheck(_, _)
            | EngineError::RetriesExhausted(_, _)
            | EngineError::MonitorTimeout(_) => "monitor",

            EngineError::FileNotFound(_) | EngineError::FileRead(_) => "io",

            EngineError::Internal(_) => "internal",
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => EngineError::FileNotFound(err.to_string()),
            io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => {
                EngineError::FeedConnection(err.to_string())
            }
            _ => EngineError::FileRead(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::FeedData(format!("JSON parse error: {}", err))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for EngineError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => EngineError::FeedClosed,
            other => EngineError::FeedConnection(other.to_string()),
        }
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::InvalidParameter("period".to_string(), "must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid parameter 'period': must be positive");
    }

    #[test]
    fn test_error_category() {
        let err = EngineError::Config(ConfigError::Validation("test".to_string()));
        assert_eq!(err.category(), "config");

        let err = EngineError::FeedData("test".to_string());
        assert_eq!(err.category(), "feed");

        let err = EngineError::MonitorTimeout("tx-1".to_string());
        assert_eq!(err.category(), "monitor");
    }

    #[test]
    fn test_retryable() {
        assert!(EngineError::FeedConnection("reset".to_string()).is_retryable());
        assert!(EngineError::SwapFailed("rejected".to_string()).is_retryable());
        assert!(!EngineError::InvalidState("nan".to_string()).is_retryable());
        assert!(!EngineError::FeedClosed.is_retryable());
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "prices.csv");
        let err: EngineError = io_err.into();
        assert!(matches!(err, EngineError::FileNotFound(_)));
    }
}
