//! IMU resampling
//!
//! Raw IMU artifacts hold one reading per sensor tick. They are reduced to
//! fixed windows (10 ms by default) carrying `min`, `max`, `mean` and sample
//! `var` per channel, tagged with the recording device, and stored next to
//! the raw artifact.

use chrono::{DateTime, Utc};
use rcd_common::config::MdfParserSettings;
use rcd_common::imu::{ImuSample, ImuSource};
use rcd_common::stats::{mean, sample_variance};
use rcd_common::store::ArtifactStore;
use rcd_common::time::from_epoch_millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::paths::processed_imu_path_for;

/// One accelerometer and gyroscope reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImuReading {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub acc_x: f64,
    pub acc_y: f64,
    pub acc_z: f64,
    pub gyr_x: f64,
    pub gyr_y: f64,
    pub gyr_z: f64,
}

impl RawImuReading {
    fn channels(&self) -> [(&'static str, f64); 6] {
        [
            ("acc_x", self.acc_x),
            ("acc_y", self.acc_y),
            ("acc_z", self.acc_z),
            ("gyr_x", self.gyr_x),
            ("gyr_y", self.gyr_y),
            ("gyr_z", self.gyr_z),
        ]
    }
}

/// Decode a raw IMU artifact (a JSON list of readings).
pub fn parse_readings(bytes: &[u8]) -> Result<Vec<RawImuReading>> {
    serde_json::from_slice(bytes).map_err(|e| Error::ImuParse(e.to_string()))
}

/// Windowed statistics over raw readings
#[derive(Debug, Clone)]
pub struct ImuTransformer {
    window_ms: i64,
}

impl Default for ImuTransformer {
    fn default() -> Self {
        Self::new(&MdfParserSettings::default())
    }
}

impl ImuTransformer {
    pub fn new(settings: &MdfParserSettings) -> Self {
        Self {
            window_ms: i64::try_from(settings.imu_window_ms.max(1)).unwrap_or(i64::MAX),
        }
    }

    /// Resample `readings` into epoch aligned windows.
    ///
    /// Each output sample is stamped with its window start. Windows with
    /// fewer than two readings have no variance and are dropped.
    pub fn transform(&self, readings: &[RawImuReading], source: &ImuSource) -> Vec<ImuSample> {
        let mut windows: BTreeMap<i64, Vec<&RawImuReading>> = BTreeMap::new();
        for reading in readings {
            let millis = reading.timestamp.timestamp_millis();
            let start = millis.div_euclid(self.window_ms) * self.window_ms;
            windows.entry(start).or_default().push(reading);
        }

        let total = windows.len();
        let samples: Vec<ImuSample> = windows
            .into_iter()
            .filter_map(|(start, members)| self.window_sample(start, &members, source))
            .collect();

        debug!(
            "Resampled {} readings into {} windows ({} dropped)",
            readings.len(),
            samples.len(),
            total - samples.len()
        );
        samples
    }

    fn window_sample(
        &self,
        start_ms: i64,
        members: &[&RawImuReading],
        source: &ImuSource,
    ) -> Option<ImuSample> {
        let timestamp = from_epoch_millis(start_ms)?;
        let mut sample = ImuSample::new(source.clone(), timestamp);

        let channels = members.first()?.channels();
        for (index, (channel, _)) in channels.iter().enumerate() {
            let values: Vec<f64> = members.iter().map(|r| r.channels()[index].1).collect();

            let min = values.iter().copied().reduce(f64::min)?;
            let max = values.iter().copied().reduce(f64::max)?;
            sample.values.insert(format!("{}_min", channel), min);
            sample.values.insert(format!("{}_max", channel), max);
            sample.values.insert(format!("{}_mean", channel), mean(&values)?);
            sample.values.insert(format!("{}_var", channel), sample_variance(&values)?);
        }
        Some(sample)
    }
}

/// Result of processing one raw IMU artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImuOutcome {
    pub processed_path: String,
    pub samples: usize,
}

/// Downloads, resamples and stores IMU artifacts
pub struct ImuHandler {
    store: Arc<dyn ArtifactStore>,
    transformer: ImuTransformer,
}

impl ImuHandler {
    pub fn new(store: Arc<dyn ArtifactStore>, transformer: ImuTransformer) -> Self {
        Self { store, transformer }
    }

    pub async fn process_request(&self, imu_path: &str, source: &ImuSource) -> Result<ImuOutcome> {
        let bytes = self.store.download(imu_path).await?;
        let readings = parse_readings(&bytes)?;
        info!("IMU has been downloaded and parsed ({} readings)", readings.len());

        let samples = self.transformer.transform(&readings, source);
        if samples.is_empty() {
            warn!("IMU artifact {} produced no complete windows", imu_path);
        }

        let processed_path = processed_imu_path_for(imu_path);
        let body = serde_json::to_vec(&samples)?;
        self.store.upload(&body, &processed_path).await?;
        info!("Stored {} IMU samples at {}", samples.len(), processed_path);

        Ok(ImuOutcome {
            processed_path,
            samples: samples.len(),
        })
    }
}
