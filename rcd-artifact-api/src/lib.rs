//! # rcd-artifact-api
//!
//! Ingests processed IMU artifacts and determines which time ranges of the
//! recording device they cover.

pub mod error;
pub mod imu;
pub mod imu_gap_finder;

pub use error::{Error, Result};
pub use imu::{ImuIngestOutcome, ImuIngestor};
pub use imu_gap_finder::{ImuGapFinder, TimeRange};
