//! Error types for rcd-mdfparser
//!
//! Malformed artifacts are terminal for that artifact and are never retried;
//! only store I/O failures are worth another attempt.

use thiserror::Error;

/// Main error type for the parser service
#[derive(Error, Debug)]
pub enum Error {
    /// Raw document lacks its temporal anchors or holds unusable values
    #[error("Invalid MDF: {0}")]
    InvalidMdf(String),

    /// Search window ends before it starts (or is empty where a length is required)
    #[error("Invalid search window: {start} to {end}")]
    InvalidWindow { start: i64, end: i64 },

    /// Artifact path does not carry the recording timestamps
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// Raw IMU content could not be decoded
    #[error("Failed to parse IMU: {0}")]
    ImuParse(String),

    /// A single aggregator failed
    #[error("Processor {name} failed: {message}")]
    Processor { name: String, message: String },

    /// Every aggregator failed, nothing worth persisting
    #[error("Not a single processing succeeded ({failed} processors failed)")]
    NoProcessingSuccessful { failed: usize },

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// rcd-common error
    #[error(transparent)]
    Common(#[from] rcd_common::Error),
}

impl Error {
    /// Whether the caller may retry the same artifact.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Common(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Convenience Result type using the parser Error
pub type Result<T> = std::result::Result<T, Error>;
