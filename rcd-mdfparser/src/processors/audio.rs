//! Audio channel metrics
//!
//! Both processors pool the left (`ch0`) and right (`ch1`) channel values
//! from the frames that carry them.

use rcd_common::stats::mean;
use rcd_common::SignalTable;

use super::{overview, Processor, RecordingOverview};
use crate::error::Result;

fn both_channels(signals: &SignalTable, ch0: &str, ch1: &str) -> Vec<f64> {
    let mut values = signals.numeric_values(ch0);
    values.extend(signals.numeric_values(ch1));
    values
}

/// Mean of the per-frame channel sums
///
/// Averages only the values present: a frame without `sum_ch0` or `sum_ch1`
/// adds nothing to the numerator or the count, rather than a `0.0` sample.
pub struct MeanAudioBias;

impl Processor for MeanAudioBias {
    fn name(&self) -> &'static str {
        "MeanAudioBias"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        let sums = both_channels(signals, "sum_ch0", "sum_ch1");
        Ok(overview("mean_audio_bias", mean(&sums).unwrap_or(0.0)))
    }
}

/// Loudest RMS value over both channels; absent values are not read as `0.0`
pub struct MaxAudioLoudness;

impl Processor for MaxAudioLoudness {
    fn name(&self) -> &'static str {
        "MaxAudioLoudness"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        let loudest = both_channels(signals, "rms_ch0", "rms_ch1")
            .into_iter()
            .reduce(f64::max)
            .unwrap_or(0.0);
        Ok(overview("max_audio_loudness", loudest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcd_common::{SignalFrame, SignalValue};
    use std::time::Duration;

    fn table(frames: &[(u64, &[(&str, f64)])]) -> SignalTable {
        frames
            .iter()
            .map(|(secs, fields)| {
                let frame: SignalFrame = fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), SignalValue::Float(*v)))
                    .collect();
                (Duration::from_secs(*secs), frame)
            })
            .collect()
    }

    fn value(out: &RecordingOverview, key: &str) -> f64 {
        out[key].as_f64()
    }

    #[test]
    fn test_mean_bias_pools_channels() {
        let signals = table(&[
            (5, &[("sum_ch0", 0.3), ("sum_ch1", 0.2)]),
            (15, &[("sum_ch0", 0.3), ("sum_ch1", 0.4)]),
        ]);
        let out = MeanAudioBias.compute(&signals).unwrap();
        assert!((value(&out, "mean_audio_bias") - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_mean_bias_uses_only_present_values() {
        let signals = table(&[(5, &[("sum_ch0", 0.6)]), (6, &[("other", 9.0)])]);
        let out = MeanAudioBias.compute(&signals).unwrap();
        assert!((value(&out, "mean_audio_bias") - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_max_loudness_right_and_left() {
        let right = table(&[
            (5, &[("rms_ch0", -30.0), ("rms_ch1", -20.0)]),
            (15, &[("rms_ch0", -30.0), ("rms_ch1", -40.0)]),
            (16, &[("rms_ch0", -30.0), ("rms_ch1", -60.0)]),
        ]);
        let left = table(&[
            (5, &[("rms_ch0", -60.0), ("rms_ch1", -30.0)]),
            (20, &[("rms_ch0", -10.0), ("rms_ch1", -30.0)]),
        ]);
        assert_eq!(
            value(&MaxAudioLoudness.compute(&right).unwrap(), "max_audio_loudness"),
            -20.0
        );
        assert_eq!(
            value(&MaxAudioLoudness.compute(&left).unwrap(), "max_audio_loudness"),
            -10.0
        );
    }

    #[test]
    fn test_empty_table_defaults() {
        let empty = SignalTable::new();
        assert_eq!(
            MeanAudioBias.compute(&empty).unwrap()["mean_audio_bias"],
            SignalValue::Float(0.0)
        );
        assert_eq!(
            MaxAudioLoudness.compute(&empty).unwrap()["max_audio_loudness"],
            SignalValue::Float(0.0)
        );
    }
}
