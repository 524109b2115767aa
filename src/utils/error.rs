//! Error handling for photoqueue

use thiserror::Error;

/// Main error type for photoqueue
#[derive(Debug, Error)]
pub enum PhotoQueueError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, PhotoQueueError>;
