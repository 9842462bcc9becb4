//! Ride detection metrics

use rcd_common::{SignalTable, SignalValue};

use super::{overview, Processor, RecordingOverview};
use crate::error::Result;

const PEOPLE_COUNT_BEFORE: &str = "RideInfo_people_count_before_value";
const PEOPLE_COUNT_AFTER: &str = "RideInfo_people_count_after_value";

/// Reported when no ride was ever detected
const NO_RIDE: i64 = -1;

/// Number of frames carrying a ride detection result
pub struct RideDetectionCounter;

impl Processor for RideDetectionCounter {
    fn name(&self) -> &'static str {
        "RideDetectionCounter"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        let rides = signals
            .iter()
            .filter(|(_, frame)| {
                frame.contains_key(PEOPLE_COUNT_BEFORE) || frame.contains_key(PEOPLE_COUNT_AFTER)
            })
            .count();
        Ok(overview("ride_detection_counter", rides as i64))
    }
}

/// People counted before the last detected ride
pub struct RideDetectionPeopleCountBefore;

impl Processor for RideDetectionPeopleCountBefore {
    fn name(&self) -> &'static str {
        "RideDetectionPeopleCountBefore"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        Ok(overview(
            "ride_detection_people_count_before",
            last_value(signals, PEOPLE_COUNT_BEFORE),
        ))
    }
}

/// People counted after the last detected ride
pub struct RideDetectionPeopleCountAfter;

impl Processor for RideDetectionPeopleCountAfter {
    fn name(&self) -> &'static str {
        "RideDetectionPeopleCountAfter"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        Ok(overview(
            "ride_detection_people_count_after",
            last_value(signals, PEOPLE_COUNT_AFTER),
        ))
    }
}

fn last_value(signals: &SignalTable, field: &str) -> SignalValue {
    signals
        .field_values(field)
        .next_back()
        .copied()
        .unwrap_or(SignalValue::Int(NO_RIDE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcd_common::SignalFrame;
    use std::time::Duration;

    fn table(frames: &[(u64, &[(&str, i64)])]) -> SignalTable {
        frames
            .iter()
            .map(|(secs, fields)| {
                let frame: SignalFrame = fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), SignalValue::Int(*v)))
                    .collect();
                (Duration::from_secs(*secs), frame)
            })
            .collect()
    }

    fn multiple_rides() -> SignalTable {
        table(&[
            (5, &[(PEOPLE_COUNT_BEFORE, 2), (PEOPLE_COUNT_AFTER, 3)]),
            (15, &[(PEOPLE_COUNT_BEFORE, 3), (PEOPLE_COUNT_AFTER, 0)]),
            (16, &[("something else", 20)]),
        ])
    }

    #[test]
    fn test_counter_on_empty_table() {
        let out = RideDetectionCounter.compute(&SignalTable::new()).unwrap();
        assert_eq!(out["ride_detection_counter"], SignalValue::Int(0));
    }

    #[test]
    fn test_counter_counts_frames_with_either_field() {
        let signals = table(&[
            (1, &[(PEOPLE_COUNT_BEFORE, 1)]),
            (2, &[(PEOPLE_COUNT_AFTER, 1)]),
            (3, &[("other", 1)]),
        ]);
        let out = RideDetectionCounter.compute(&signals).unwrap();
        assert_eq!(out["ride_detection_counter"], SignalValue::Int(2));
    }

    #[test]
    fn test_people_count_defaults_to_minus_one() {
        let empty = SignalTable::new();
        let before = RideDetectionPeopleCountBefore.compute(&empty).unwrap();
        let after = RideDetectionPeopleCountAfter.compute(&empty).unwrap();
        assert_eq!(before["ride_detection_people_count_before"], SignalValue::Int(-1));
        assert_eq!(after["ride_detection_people_count_after"], SignalValue::Int(-1));
    }

    #[test]
    fn test_people_count_single_ride() {
        let signals = table(&[(5, &[(PEOPLE_COUNT_BEFORE, 2), (PEOPLE_COUNT_AFTER, 3)])]);
        let before = RideDetectionPeopleCountBefore.compute(&signals).unwrap();
        let after = RideDetectionPeopleCountAfter.compute(&signals).unwrap();
        assert_eq!(before["ride_detection_people_count_before"], SignalValue::Int(2));
        assert_eq!(after["ride_detection_people_count_after"], SignalValue::Int(3));
    }

    #[test]
    fn test_people_count_takes_last_ride() {
        let signals = multiple_rides();
        let before = RideDetectionPeopleCountBefore.compute(&signals).unwrap();
        let after = RideDetectionPeopleCountAfter.compute(&signals).unwrap();
        assert_eq!(before["ride_detection_people_count_before"], SignalValue::Int(3));
        assert_eq!(after["ride_detection_people_count_after"], SignalValue::Int(0));
    }
}
