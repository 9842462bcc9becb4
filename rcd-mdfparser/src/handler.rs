//! Metadata artifact handling
//!
//! One request turns a raw metadata artifact into:
//! - a synchronized signal table stored next to the artifact as
//!   `<recording>_signals.json`
//! - the recording overview computed by every processor
//!
//! A failing processor only loses its own metrics. The request fails when no
//! processor succeeded at all, in which case nothing is stored.

use rcd_common::store::ArtifactStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::paths::{extract_timestamps, signals_path_for};
use crate::processors::{ProcessorFailure, ProcessorSet, RecordingOverview};
use crate::raw::{RawDocument, SourceKind};
use crate::synchronizer::TimeBucketSynchronizer;

/// What a processed metadata artifact produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataOutcome {
    pub signals_path: String,
    pub recording_overview: RecordingOverview,
    pub failures: Vec<ProcessorFailure>,
}

pub struct MetadataHandler {
    store: Arc<dyn ArtifactStore>,
    synchronizer: TimeBucketSynchronizer,
    processors: ProcessorSet,
}

impl MetadataHandler {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        synchronizer: TimeBucketSynchronizer,
        processors: ProcessorSet,
    ) -> Self {
        Self {
            store,
            synchronizer,
            processors,
        }
    }

    /// Process a single metadata artifact.
    pub async fn process_request(&self, path: &str, kind: SourceKind) -> Result<MetadataOutcome> {
        self.process_sources(&[(path, kind)]).await
    }

    /// Process several artifacts of the same recording as one table.
    ///
    /// The recording window and the signals location come from the first
    /// path; later sources win when they set the same field at the same
    /// offset.
    pub async fn process_sources(&self, sources: &[(&str, SourceKind)]) -> Result<MetadataOutcome> {
        let request_id = Uuid::new_v4();
        let (primary, _) = sources
            .first()
            .ok_or_else(|| Error::InvalidFileName("no artifact given".to_string()))?;
        info!(request_id = %request_id, "Starting processing of metadata for {}", primary);

        let (from, to) = extract_timestamps(primary)?;

        let mut raws = Vec::with_capacity(sources.len());
        for (path, kind) in sources {
            let bytes = self.store.download(path).await?;
            raws.push(RawDocument::from_slice(*kind, &bytes)?);
        }
        let signals = Arc::new(self.synchronizer.synchronize_all(&raws, from, to)?);
        debug!(request_id = %request_id, "Synchronized {} frames", signals.len());

        let report = self.processors.process_all(Arc::clone(&signals)).await;
        if report.succeeded == 0 {
            return Err(Error::NoProcessingSuccessful {
                failed: report.failures.len(),
            });
        }
        info!(
            request_id = %request_id,
            "Successfully processed metadata for {} ({} of {} processors)",
            primary,
            report.succeeded,
            self.processors.count()
        );
        debug!(request_id = %request_id, "Recording overview fields: {:?}", report.overview);

        let signals_path = signals_path_for(primary);
        let body = signals.to_json_string()?;
        self.store.upload(body.as_bytes(), &signals_path).await?;

        Ok(MetadataOutcome {
            signals_path,
            recording_overview: report.overview,
            failures: report.failures,
        })
    }
}
