//! Error types for rcd-artifact-api

use thiserror::Error;

/// Main error type for the artifact API
#[derive(Error, Debug)]
pub enum Error {
    /// IMU artifact holds no samples, so there is nothing to correlate
    #[error("The IMU sample list does not contain any information")]
    ImuEmpty,

    /// Processed IMU content could not be decoded
    #[error("Failed to parse IMU: {0}")]
    ImuParse(String),

    /// rcd-common error
    #[error(transparent)]
    Common(#[from] rcd_common::Error),
}

impl Error {
    /// Whether the caller may retry the same artifact.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Common(e) => e.is_retryable(),
            Error::ImuEmpty | Error::ImuParse(_) => false,
        }
    }
}

/// Convenience Result type using the artifact API Error
pub type Result<T> = std::result::Result<T, Error>;
