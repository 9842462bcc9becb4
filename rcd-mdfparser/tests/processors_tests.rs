//! Integration tests for the recording overview processors

use rcd_common::{SignalFrame, SignalTable, SignalValue};
use rcd_mdfparser::processors::{
    ChcCounter, GnssCoverage, MaxPersonCount, MeanAudioBias, RideDetectionCounter, SumDoorClosed,
};
use rcd_mdfparser::{Processor, ProcessorSet};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn table(frames: &[(u64, &[(&str, SignalValue)])]) -> SignalTable {
    frames
        .iter()
        .map(|(secs, fields)| {
            let frame: SignalFrame = fields.iter().map(|(k, v)| (k.to_string(), *v)).collect();
            (Duration::from_secs(*secs), frame)
        })
        .collect()
}

#[test]
fn test_max_person_count_on_empty_table() {
    let output = MaxPersonCount.process(&SignalTable::new()).unwrap();
    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({"recording_overview": {"max_person_count": 0}})
    );
}

#[test]
fn test_max_person_count_peak() {
    let signals = table(&[
        (5, &[("PersonCount_value", SignalValue::Int(2))]),
        (16, &[("PersonCount_value", SignalValue::Int(3))]),
        (20, &[("PersonCount_value", SignalValue::Int(2))]),
    ]);
    let output = MaxPersonCount.process(&signals).unwrap();
    assert_eq!(output.recording_overview["max_person_count"], SignalValue::Int(3));
}

#[test]
fn test_mean_audio_bias() {
    let signals = table(&[
        (
            5,
            &[("sum_ch0", SignalValue::Float(0.3)), ("sum_ch1", SignalValue::Float(0.2))],
        ),
        (
            15,
            &[("sum_ch0", SignalValue::Float(0.3)), ("sum_ch1", SignalValue::Float(0.4))],
        ),
    ]);
    let output = MeanAudioBias.process(&signals).unwrap();
    let bias = output.recording_overview["mean_audio_bias"].as_f64();
    assert!((bias - 0.3).abs() < 1e-9, "got {bias}");
}

#[test]
fn test_sum_door_closed_counts_falsy_confidence() {
    let signals = table(&[
        (5, &[("DoorClosedConfidence", SignalValue::Float(0.0))]),
        (6, &[("DoorClosedConfidence", SignalValue::Int(0))]),
        (7, &[("other", SignalValue::Float(1.0))]),
    ]);
    let output = SumDoorClosed.process(&signals).unwrap();
    assert_eq!(output.recording_overview["sum_door_closed"], SignalValue::Int(2));
}

#[test]
fn test_ride_detection_counter_on_empty_table() {
    let output = RideDetectionCounter.process(&SignalTable::new()).unwrap();
    assert_eq!(output.recording_overview["ride_detection_counter"], SignalValue::Int(0));
}

#[test]
fn test_chc_counter_without_health_responses() {
    let signals = table(&[(5, &[("other", SignalValue::Int(1))]), (10, &[("other", SignalValue::Int(1))])]);
    let output = ChcCounter.process(&signals).unwrap();
    assert_eq!(output.recording_overview["number_chc_events"], SignalValue::Int(0));
    assert_eq!(output.recording_overview["chc_duration"], SignalValue::Float(0.0));
}

#[test]
fn test_gnss_coverage_on_empty_table() {
    let output = GnssCoverage.process(&SignalTable::new()).unwrap();
    assert_eq!(output.recording_overview["gnss_coverage"], SignalValue::Float(0.0));
}

#[tokio::test]
async fn test_processor_set_builds_full_overview() {
    let signals = table(&[
        (
            5,
            &[
                ("PersonCount_value", SignalValue::Int(2)),
                ("RideInfo_people_count_before_value", SignalValue::Int(1)),
                ("RideInfo_people_count_after_value", SignalValue::Int(2)),
                ("Gnss_satellites_used", SignalValue::Int(6)),
                ("Gnss_horizontal_speed_accuracy", SignalValue::Float(3.5)),
                ("rms_ch0", SignalValue::Float(-30.0)),
                ("rms_ch1", SignalValue::Float(-25.0)),
            ],
        ),
        (
            10,
            &[
                ("PersonCount_value", SignalValue::Int(4)),
                ("DoorClosedConfidence", SignalValue::Float(0.9)),
            ],
        ),
    ]);

    let report = ProcessorSet::with_defaults().process_all(Arc::new(signals)).await;

    assert!(report.failures.is_empty());
    assert_eq!(report.succeeded, 11);
    let overview = serde_json::to_value(&report.overview).unwrap();
    assert_eq!(
        overview,
        json!({
            "chc_duration": 0.0,
            "gnss_coverage": 0.5,
            "max_audio_loudness": -25.0,
            "max_person_count": 4,
            "mean_audio_bias": 0.0,
            "median_person_count": 3.0,
            "number_chc_events": 0,
            "ride_detection_counter": 1,
            "ride_detection_people_count_after": 2,
            "ride_detection_people_count_before": 1,
            "sum_door_closed": 1,
            "variance_person_count": 1.0
        })
    );
}
