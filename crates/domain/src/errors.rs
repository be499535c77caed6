//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for TidyHome
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TidyHomeError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Worker {0} has no linked payee account")]
    MissingPayeeAccount(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TidyHomeError {
    /// Whether re-invoking the failed operation may succeed without changes.
    ///
    /// Gateway rejections are not retryable on their own; network failures,
    /// timeouts and a busy/locked database are.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Database(message) => message.contains("busy") || message.contains("locked"),
            _ => false,
        }
    }

    /// True for errors that originate in the persistence layer.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Result type alias for TidyHome operations
pub type Result<T> = std::result::Result<T, TidyHomeError>;
