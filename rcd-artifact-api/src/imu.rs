//! Processed IMU ingestion
//!
//! Unlike [`ImuGapFinder`], which happily maps no samples to no ranges,
//! ingestion requires at least one sample: an empty artifact is reported as
//! [`Error::ImuEmpty`].

use rcd_common::imu::ImuSample;
use rcd_common::store::ArtifactStore;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::imu_gap_finder::{ImuGapFinder, TimeRange};

/// Ranges covered by one IMU artifact and the device that recorded it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImuIngestOutcome {
    pub ranges: Vec<TimeRange>,
    pub tenant: String,
    pub device_id: String,
}

/// Decode a processed IMU artifact (a JSON list of samples).
pub fn parse_samples(bytes: &[u8]) -> Result<Vec<ImuSample>> {
    serde_json::from_slice(bytes).map_err(|e| Error::ImuParse(e.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct ImuIngestor {
    gap_finder: ImuGapFinder,
}

impl ImuIngestor {
    pub fn new(gap_finder: ImuGapFinder) -> Self {
        Self { gap_finder }
    }

    pub fn process(&self, samples: &[ImuSample]) -> Result<ImuIngestOutcome> {
        let Some(first) = samples.first() else {
            warn!("The IMU sample list does not contain any information");
            return Err(Error::ImuEmpty);
        };

        let ranges = self.gap_finder.get_valid_imu_time_ranges(samples);
        info!(
            tenant = %first.source.tenant,
            device_id = %first.source.device_id,
            "IMU data covers {} time ranges",
            ranges.len()
        );

        Ok(ImuIngestOutcome {
            ranges,
            tenant: first.source.tenant.clone(),
            device_id: first.source.device_id.clone(),
        })
    }

    /// Download a processed IMU artifact and ingest it.
    pub async fn process_artifact(
        &self,
        store: &dyn ArtifactStore,
        path: &str,
    ) -> Result<ImuIngestOutcome> {
        let bytes = store.download(path).await?;
        let samples = parse_samples(&bytes)?;
        self.process(&samples)
    }
}
