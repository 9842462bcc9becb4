//! Camera health check event counting
//!
//! A frame is flagged when it carries both the blocked (`cvb`) and the
//! exposure (`cve`) health responses and either of them is at least `1`. Flagged frame
//! indices at most [`GROUP_TOLERANCE`] apart form one event. An event lasts
//! from its first frame until the frame following its last one; when the
//! event reaches the end of the table the previous frame spacing is assumed,
//! or one second for a single-frame table.

use rcd_common::{SignalFrame, SignalTable};
use std::time::Duration;
use tracing::info;

use super::{Processor, RecordingOverview};
use crate::error::Result;

const CVB: &str = "interior_camera_health_response_cvb";
const CVE: &str = "interior_camera_health_response_cve";

/// Maximum index distance between flagged frames of one event
pub const GROUP_TOLERANCE: usize = 2;

/// One camera health check event
#[derive(Debug, Clone, PartialEq)]
pub struct ChcPeriod {
    /// Indices of the flagged frames, in table order
    pub frames: Vec<usize>,
    pub duration: Duration,
}

pub struct ChcCounter;

impl ChcCounter {
    /// Camera health check events in table order.
    pub fn periods(&self, signals: &SignalTable) -> Vec<ChcPeriod> {
        let offsets: Vec<Duration> = signals.offsets().copied().collect();
        let flagged: Vec<usize> = signals
            .iter()
            .enumerate()
            .filter(|(_, (_, frame))| is_flagged(frame))
            .map(|(i, _)| i)
            .collect();

        let periods: Vec<ChcPeriod> = group_indices(&flagged, GROUP_TOLERANCE)
            .into_iter()
            .filter_map(|frames| {
                let first = *frames.first()?;
                let last = *frames.last()?;
                let end = match offsets.get(last + 1) {
                    Some(next) => *next,
                    None if last > 0 => offsets[last] + (offsets[last] - offsets[last - 1]),
                    None => offsets[last] + Duration::from_secs(1),
                };
                Some(ChcPeriod {
                    duration: end - offsets[first],
                    frames,
                })
            })
            .collect();

        info!("Identified {} CHC periods", periods.len());
        periods
    }
}

impl Processor for ChcCounter {
    fn name(&self) -> &'static str {
        "ChcCounter"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        let periods = self.periods(signals);
        let total: f64 = periods.iter().map(|p| p.duration.as_secs_f64()).sum();

        let mut overview = RecordingOverview::new();
        overview.insert("number_chc_events".to_string(), (periods.len() as i64).into());
        overview.insert("chc_duration".to_string(), total.into());
        Ok(overview)
    }
}

fn is_flagged(frame: &SignalFrame) -> bool {
    match (frame.get(CVB), frame.get(CVE)) {
        (Some(cvb), Some(cve)) => cvb.as_f64() >= 1.0 || cve.as_f64() >= 1.0,
        _ => false,
    }
}

/// Split ascending indices wherever two neighbours are more than `tolerance` apart.
fn group_indices(indices: &[usize], tolerance: usize) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for &index in indices {
        match groups.last_mut() {
            Some(group) if group.last().is_some_and(|&prev| index - prev <= tolerance) => {
                group.push(index)
            }
            _ => groups.push(vec![index]),
        }
    }
    groups
}
