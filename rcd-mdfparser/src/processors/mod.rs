//! Recording overview processors
//!
//! Each processor reduces a synchronized [`SignalTable`] to one or two named
//! metrics of the recording overview. Processors only read the table, so a
//! [`ProcessorSet`] runs all of them concurrently against one shared table.
//!
//! # Processors
//! 1. **ride_detection** - rides counted and people before / after the last ride
//! 2. **person_count** - max, median and variance of `PersonCount_value`
//! 3. **door** - number of door closed detections
//! 4. **audio** - mean bias and max loudness over both channels
//! 5. **gnss** - share of frames with a usable fix
//! 6. **chc_counter** - camera health check events and their total duration
//!
//! # Error isolation
//! A failing (or panicking) processor is reported with its name and does not
//! affect the others.

pub mod audio;
pub mod chc_counter;
pub mod door;
pub mod gnss;
pub mod person_count;
pub mod ride_detection;

pub use audio::{MaxAudioLoudness, MeanAudioBias};
pub use chc_counter::{ChcCounter, ChcPeriod};
pub use door::SumDoorClosed;
pub use gnss::GnssCoverage;
pub use person_count::{MaxPersonCount, MedianPersonCount, VariancePersonCount};
pub use ride_detection::{
    RideDetectionCounter, RideDetectionPeopleCountAfter, RideDetectionPeopleCountBefore,
};

use futures::future::join_all;
use rcd_common::{SignalTable, SignalValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Metric name to value
pub type RecordingOverview = BTreeMap<String, SignalValue>;

/// What a single processor contributes to the recording metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessorOutput {
    pub recording_overview: RecordingOverview,
}

/// One aggregation over a signal table
pub trait Processor: Send + Sync {
    /// Stable identifier used in logs and failure reports
    fn name(&self) -> &'static str;

    /// Compute this processor's overview metrics.
    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview>;

    /// Run [`Processor::compute`] between start and finish log markers.
    fn process(&self, signals: &SignalTable) -> Result<ProcessorOutput> {
        debug!(processor = self.name(), "starting processing with {}", self.name());
        let recording_overview = self.compute(signals)?;
        debug!(processor = self.name(), "finished processing {}", self.name());
        Ok(ProcessorOutput { recording_overview })
    }
}

/// Single-metric overview
pub(crate) fn overview(key: &str, value: impl Into<SignalValue>) -> RecordingOverview {
    RecordingOverview::from([(key.to_string(), value.into())])
}

/// A processor that did not produce output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessorFailure {
    pub processor: String,
    pub error: String,
}

impl ProcessorFailure {
    pub fn new(processor: &str, error: &Error) -> Self {
        Self {
            processor: processor.to_string(),
            error: error.to_string(),
        }
    }
}

/// Combined result of running a [`ProcessorSet`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverviewReport {
    /// Outputs of all successful processors, merged in processor order
    pub overview: RecordingOverview,
    pub failures: Vec<ProcessorFailure>,
    pub succeeded: usize,
}

/// Runs every processor against the same table
///
/// # Example
/// ```rust,ignore
/// let processors = ProcessorSet::with_defaults();
/// let report = processors.process_all(Arc::new(table)).await;
///
/// for failure in &report.failures {
///     println!("{} failed: {}", failure.processor, failure.error);
/// }
/// ```
pub struct ProcessorSet {
    processors: Vec<Arc<dyn Processor>>,
}

impl ProcessorSet {
    pub fn new(processors: Vec<Arc<dyn Processor>>) -> Self {
        Self { processors }
    }

    /// Every processor that contributes to the recording overview
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Arc::new(ChcCounter),
            Arc::new(GnssCoverage),
            Arc::new(MaxAudioLoudness),
            Arc::new(MaxPersonCount),
            Arc::new(MeanAudioBias),
            Arc::new(MedianPersonCount),
            Arc::new(VariancePersonCount),
            Arc::new(RideDetectionCounter),
            Arc::new(RideDetectionPeopleCountBefore),
            Arc::new(RideDetectionPeopleCountAfter),
            Arc::new(SumDoorClosed),
        ])
    }

    /// Run all processors concurrently on blocking threads.
    ///
    /// Results are merged in processor order, so a later processor emitting
    /// an already present key replaces it.
    pub async fn process_all(&self, signals: Arc<SignalTable>) -> OverviewReport {
        let futures = self.processors.iter().map(|processor| {
            let processor = Arc::clone(processor);
            let signals = Arc::clone(&signals);
            let name = processor.name();
            async move {
                let outcome = tokio::task::spawn_blocking(move || processor.process(&signals))
                    .await
                    .unwrap_or_else(|e| {
                        Err(Error::Processor {
                            name: name.to_string(),
                            message: format!("processor panicked: {}", e),
                        })
                    });
                (name, outcome)
            }
        });

        let mut report = OverviewReport::default();
        for (name, outcome) in join_all(futures).await {
            match outcome {
                Ok(output) => {
                    report.overview.extend(output.recording_overview);
                    report.succeeded += 1;
                }
                Err(error) => {
                    warn!(processor = name, error = %error, "Processing failed");
                    report.failures.push(ProcessorFailure::new(name, &error));
                }
            }
        }
        report
    }

    pub fn count(&self) -> usize {
        self.processors.len()
    }
}
