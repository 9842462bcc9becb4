//! Person count statistics
//!
//! All three processors read `PersonCount_value` from the frames that carry
//! it and report `0` when none does.

use rcd_common::stats::{median, population_variance, round_to};
use rcd_common::{SignalTable, SignalValue};

use super::{overview, Processor, RecordingOverview};
use crate::error::Result;

const PERSON_COUNT: &str = "PersonCount_value";

pub struct MaxPersonCount;

impl Processor for MaxPersonCount {
    fn name(&self) -> &'static str {
        "MaxPersonCount"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        let max = signals
            .field_values(PERSON_COUNT)
            .copied()
            .reduce(|max, value| if value.as_f64() > max.as_f64() { value } else { max })
            .unwrap_or(SignalValue::Int(0));
        Ok(overview("max_person_count", max))
    }
}

pub struct MedianPersonCount;

impl Processor for MedianPersonCount {
    fn name(&self) -> &'static str {
        "MedianPersonCount"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        let counts = signals.numeric_values(PERSON_COUNT);
        Ok(overview("median_person_count", median(&counts).unwrap_or(0.0)))
    }
}

/// Population variance, rounded to two decimals
pub struct VariancePersonCount;

impl Processor for VariancePersonCount {
    fn name(&self) -> &'static str {
        "VariancePersonCount"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        let counts = signals.numeric_values(PERSON_COUNT);
        let variance = population_variance(&counts).map_or(0.0, |v| round_to(v, 2));
        Ok(overview("variance_person_count", variance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcd_common::SignalFrame;
    use std::time::Duration;

    fn counts(entries: &[(u64, &str, i64)]) -> SignalTable {
        entries
            .iter()
            .map(|(secs, field, value)| {
                let frame = SignalFrame::from([(field.to_string(), SignalValue::Int(*value))]);
                (Duration::from_secs(*secs), frame)
            })
            .collect()
    }

    #[test]
    fn test_max_keeps_integer_type() {
        let signals = counts(&[
            (5, PERSON_COUNT, 2),
            (15, PERSON_COUNT, 2),
            (16, PERSON_COUNT, 3),
            (20, PERSON_COUNT, 2),
        ]);
        let out = MaxPersonCount.compute(&signals).unwrap();
        assert_eq!(out["max_person_count"], SignalValue::Int(3));
    }

    #[test]
    fn test_median_ignores_other_fields() {
        let signals = counts(&[
            (5, PERSON_COUNT, 1),
            (15, PERSON_COUNT, 3),
            (16, PERSON_COUNT, 3),
            (17, PERSON_COUNT, 4),
            (20, PERSON_COUNT, 1),
            (21, "something_else", 100),
        ]);
        let out = MedianPersonCount.compute(&signals).unwrap();
        assert_eq!(out["median_person_count"], SignalValue::Float(3.0));
    }

    #[test]
    fn test_median_of_even_count_averages_middle() {
        let signals = counts(&[(1, PERSON_COUNT, 1), (2, PERSON_COUNT, 2)]);
        let out = MedianPersonCount.compute(&signals).unwrap();
        assert_eq!(out["median_person_count"], SignalValue::Float(1.5));
    }

    #[test]
    fn test_variance_is_population_variance() {
        let signals = counts(&[
            (5, PERSON_COUNT, 2),
            (15, PERSON_COUNT, 1),
            (16, PERSON_COUNT, 4),
            (20, PERSON_COUNT, 3),
            (21, "something_else", 100),
        ]);
        let out = VariancePersonCount.compute(&signals).unwrap();
        assert_eq!(out["variance_person_count"], SignalValue::Float(1.25));
    }

    #[test]
    fn test_variance_is_rounded() {
        let signals = counts(&[(1, PERSON_COUNT, 0), (2, PERSON_COUNT, 1), (3, PERSON_COUNT, 1)]);
        let out = VariancePersonCount.compute(&signals).unwrap();
        assert_eq!(out["variance_person_count"], SignalValue::Float(0.22));
    }

    #[test]
    fn test_empty_table_defaults() {
        let empty = SignalTable::new();
        assert_eq!(
            MaxPersonCount.compute(&empty).unwrap()["max_person_count"],
            SignalValue::Int(0)
        );
        assert_eq!(
            MedianPersonCount.compute(&empty).unwrap()["median_person_count"],
            SignalValue::Float(0.0)
        );
        assert_eq!(
            VariancePersonCount.compute(&empty).unwrap()["variance_person_count"],
            SignalValue::Float(0.0)
        );
    }
}
