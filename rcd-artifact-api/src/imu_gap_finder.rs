//! IMU gap detection
//!
//! Splits IMU sample timestamps into maximal runs whose consecutive samples
//! are at most a threshold apart (one second by default). Each run becomes a
//! [`TimeRange`] that events of the same device can be correlated against.
//!
//! Input order is not trusted: timestamps are sorted before grouping.

use chrono::{DateTime, TimeDelta, Utc};
use rcd_common::config::ArtifactApiSettings;
use rcd_common::imu::ImuSample;
use serde::Serialize;
use tracing::debug;

/// Contiguous interval of IMU data, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.min <= instant && instant <= self.max
    }
}

#[derive(Debug, Clone)]
pub struct ImuGapFinder {
    threshold: TimeDelta,
}

impl Default for ImuGapFinder {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(1))
    }
}

impl ImuGapFinder {
    /// `threshold` is the largest spacing that does not count as a gap.
    pub fn new(threshold: TimeDelta) -> Self {
        Self { threshold }
    }

    pub fn from_settings(settings: &ArtifactApiSettings) -> Self {
        Self::new(TimeDelta::milliseconds(
            settings.imu_gap_threshold_ms.min(i64::MAX as u64) as i64,
        ))
    }

    /// Time ranges covered by the given samples; empty input gives no ranges.
    pub fn get_valid_imu_time_ranges(&self, samples: &[ImuSample]) -> Vec<TimeRange> {
        self.time_ranges(samples.iter().map(|s| s.timestamp))
    }

    /// Group instants into ranges, starting a new one wherever the spacing
    /// to the previous instant exceeds the threshold.
    pub fn time_ranges(&self, instants: impl IntoIterator<Item = DateTime<Utc>>) -> Vec<TimeRange> {
        let mut sorted: Vec<DateTime<Utc>> = instants.into_iter().collect();
        if !sorted.windows(2).all(|pair| pair[0] <= pair[1]) {
            debug!("IMU samples were not in time order, sorting {} samples", sorted.len());
            sorted.sort_unstable();
        }

        let ranges = sorted.into_iter().fold(Vec::<TimeRange>::new(), |mut ranges, instant| {
            match ranges.last_mut() {
                Some(current) if instant - current.max <= self.threshold => current.max = instant,
                _ => ranges.push(TimeRange::new(instant, instant)),
            }
            ranges
        });

        debug!("Found {} valid IMU time ranges", ranges.len());
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcd_common::time::from_epoch_millis;

    fn at(millis: i64) -> DateTime<Utc> {
        from_epoch_millis(millis).unwrap()
    }

    #[test]
    fn test_spacing_equal_to_threshold_is_not_a_gap() {
        let ranges = ImuGapFinder::default().time_ranges([at(0), at(1000), at(2001)]);
        assert_eq!(ranges, vec![TimeRange::new(at(0), at(1000)), TimeRange::new(at(2001), at(2001))]);
    }

    #[test]
    fn test_custom_threshold() {
        let finder = ImuGapFinder::from_settings(&ArtifactApiSettings {
            imu_gap_threshold_ms: 100,
        });
        let ranges = finder.time_ranges([at(0), at(50), at(200), at(250)]);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1], TimeRange::new(at(200), at(250)));
    }

    #[test]
    fn test_duplicates_stay_in_one_range() {
        let ranges = ImuGapFinder::default().time_ranges([at(5), at(5), at(5)]);
        assert_eq!(ranges, vec![TimeRange::new(at(5), at(5))]);
    }

    #[test]
    fn test_contains() {
        let range = TimeRange::new(at(10), at(20));
        assert!(range.contains(at(10)));
        assert!(range.contains(at(20)));
        assert!(!range.contains(at(21)));
    }
}
