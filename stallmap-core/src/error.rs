//! Core error types for `StallMap`.

use thiserror::Error;

/// Core error type for `StallMap` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A base URL could not be parsed or has no host.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as it was supplied.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Required input was missing or empty.
    #[error("Missing {0}")]
    MissingInput(&'static str),

    /// Data did not have the expected shape.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading interactive input failed.
    #[error("Input error: {0}")]
    Io(#[from] std::io::Error),
}
