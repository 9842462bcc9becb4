//! IMU sample model shared between the parser and the artifact API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Device that recorded an IMU artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImuSource {
    pub device_id: String,
    pub tenant: String,
}

/// One processed IMU sample
///
/// `timestamp` travels as epoch milliseconds. The remaining numeric fields
/// are the per-window statistics (`acc_x_mean`, `gyr_z_var`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    pub source: ImuSource,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl ImuSample {
    pub fn new(source: ImuSource, timestamp: DateTime<Utc>) -> Self {
        Self {
            source,
            timestamp,
            values: BTreeMap::new(),
        }
    }
}
