use rcd_common::SignalTable;

use super::{overview, Processor, RecordingOverview};
use crate::error::Result;

const SATELLITES_USED: &str = "Gnss_satellites_used";
const SPEED_ACCURACY: &str = "Gnss_horizontal_speed_accuracy";

const MIN_SATELLITES: f64 = 4.0;
const MAX_SPEED_ACCURACY: f64 = 45.0;

/// Share of all frames that hold a usable GNSS fix
pub struct GnssCoverage;

impl Processor for GnssCoverage {
    fn name(&self) -> &'static str {
        "GnssCoverage"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        if signals.is_empty() {
            return Ok(overview("gnss_coverage", 0.0));
        }

        let covered = signals
            .iter()
            .filter(|(_, frame)| {
                match (frame.get(SATELLITES_USED), frame.get(SPEED_ACCURACY)) {
                    (Some(satellites), Some(accuracy)) => {
                        satellites.as_f64() >= MIN_SATELLITES
                            && accuracy.as_f64() < MAX_SPEED_ACCURACY
                    }
                    _ => false,
                }
            })
            .count();

        Ok(overview(
            "gnss_coverage",
            covered as f64 / signals.len() as f64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcd_common::{SignalFrame, SignalValue};
    use std::time::Duration;

    fn fixes(fixes: &[(i64, i64)]) -> SignalTable {
        fixes
            .iter()
            .enumerate()
            .map(|(i, (satellites, accuracy))| {
                let frame = SignalFrame::from([
                    (SATELLITES_USED.to_string(), SignalValue::Int(*satellites)),
                    (SPEED_ACCURACY.to_string(), SignalValue::Int(*accuracy)),
                ]);
                (Duration::from_secs(i as u64 * 5), frame)
            })
            .collect()
    }

    fn coverage(signals: &SignalTable) -> SignalValue {
        GnssCoverage.compute(signals).unwrap()["gnss_coverage"]
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(coverage(&SignalTable::new()), SignalValue::Float(0.0));
    }

    #[test]
    fn test_full_coverage() {
        assert_eq!(coverage(&fixes(&[(5, 2), (5, 4), (5, 6), (5, 8)])), SignalValue::Float(1.0));
    }

    #[test]
    fn test_inaccurate_fix_is_not_covered() {
        assert_eq!(
            coverage(&fixes(&[(5, 2), (5, 4), (5, 6), (5, 150)])),
            SignalValue::Float(0.75)
        );
    }

    #[test]
    fn test_few_satellites_are_not_covered() {
        assert_eq!(
            coverage(&fixes(&[(0, 2), (1, 4), (1, 6), (5, 8)])),
            SignalValue::Float(0.25)
        );
    }

    #[test]
    fn test_frames_without_gnss_count_in_denominator() {
        let mut signals = fixes(&[(4, 44)]);
        signals.merge_frame(
            Duration::from_secs(60),
            SignalFrame::from([("PersonCount_value".to_string(), SignalValue::Int(1))]),
        );
        assert_eq!(coverage(&signals), SignalValue::Float(0.5));
    }
}
