//! # rcd-mdfparser
//!
//! Turns raw recording metadata into synchronized signals and a recording
//! overview, and resamples raw IMU artifacts.
//!
//! **Flow:** raw artifact → [`raw::RawDocument`] →
//! [`synchronizer::TimeBucketSynchronizer`] → [`rcd_common::SignalTable`] →
//! [`processors::ProcessorSet`] → recording overview

pub mod error;
pub mod handler;
pub mod imu;
pub mod paths;
pub mod processors;
pub mod raw;
pub mod synchronizer;

pub use error::{Error, Result};
pub use handler::{MetadataHandler, MetadataOutcome};
pub use processors::{Processor, ProcessorOutput, ProcessorSet, RecordingOverview};
pub use raw::{RawDocument, SourceKind};
pub use synchronizer::TimeBucketSynchronizer;
