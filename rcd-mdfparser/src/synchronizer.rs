//! Time bucket synchronization
//!
//! Turns a validated [`RawDocument`] plus the recording window
//! `[search_start, search_end]` into a [`SignalTable`] keyed by the offset of
//! each frame from `search_start`.
//!
//! - MDF frames are placed using the chunk's pts to UTC mapping; frames
//!   outside the window (inclusive) are dropped.
//! - CHC frames carry no clock and are spread evenly over the window.
//!
//! Window bounds are epochs in seconds or milliseconds. Synchronization is
//! deterministic and holds no state between calls.

use rcd_common::config::MdfParserSettings;
use rcd_common::time::epoch_to_micros;
use rcd_common::SignalTable;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::raw::{ChcDocument, MdfDocument, RawDocument};

/// Builds signal tables from raw documents
#[derive(Debug, Clone)]
pub struct TimeBucketSynchronizer {
    expected_chc_fps: f64,
    chc_fps_tolerance: f64,
}

impl Default for TimeBucketSynchronizer {
    fn default() -> Self {
        Self::new(&MdfParserSettings::default())
    }
}

impl TimeBucketSynchronizer {
    pub fn new(settings: &MdfParserSettings) -> Self {
        Self {
            expected_chc_fps: settings.expected_chc_fps,
            chc_fps_tolerance: settings.chc_fps_tolerance,
        }
    }

    /// Synchronize one raw document over the recording window.
    pub fn synchronize(
        &self,
        raw: &RawDocument,
        search_start: i64,
        search_end: i64,
    ) -> Result<SignalTable> {
        debug!(
            "Synchronizing {} from {} to {}",
            raw.kind(),
            search_start,
            search_end
        );

        let invalid_window = || Error::InvalidWindow {
            start: search_start,
            end: search_end,
        };
        let (Some(start_us), Some(end_us)) =
            (epoch_to_micros(search_start), epoch_to_micros(search_end))
        else {
            return Err(invalid_window());
        };
        let window_us = end_us.checked_sub(start_us).ok_or_else(invalid_window)?;
        if window_us < 0 {
            return Err(invalid_window());
        }

        let table = match raw {
            RawDocument::Mdf(mdf) => self.synchronize_mdf(mdf, start_us, window_us),
            RawDocument::Chc(chc) => self
                .synchronize_chc(chc, window_us)
                .ok_or_else(invalid_window)?,
        };

        debug!(
            "Finished synchronizing {} from {} to {} ({} frames)",
            raw.kind(),
            search_start,
            search_end,
            table.len()
        );
        Ok(table)
    }

    /// Synchronize several documents into one table.
    ///
    /// Documents are merged in order; where two of them set the same field at
    /// the same offset the later one wins.
    pub fn synchronize_all(
        &self,
        raws: &[RawDocument],
        search_start: i64,
        search_end: i64,
    ) -> Result<SignalTable> {
        let mut merged = SignalTable::new();
        for raw in raws {
            merged.merge(self.synchronize(raw, search_start, search_end)?);
        }
        Ok(merged)
    }

    fn synchronize_mdf(&self, mdf: &MdfDocument, start_us: i64, window_us: i64) -> SignalTable {
        let mut table = SignalTable::new();
        let mut skipped = 0usize;

        for frame in &mdf.frames {
            // An offset that does not fit in i64 is outside any window
            match mdf.anchors.offset_micros(frame.pts, start_us) {
                Some(offset_us) if (0..=window_us).contains(&offset_us) => {
                    table.merge_frame(micros(offset_us), frame.signals.clone());
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {} MDF frames outside the recording", skipped);
        }
        table
    }

    /// `None` when there are frames but the window has no length.
    fn synchronize_chc(&self, chc: &ChcDocument, length_us: i64) -> Option<SignalTable> {
        let count = chc.frames.len() as i64;
        if count == 0 {
            return Some(SignalTable::new());
        }

        if length_us <= 0 {
            return None;
        }

        let actual_fps = count as f64 / (length_us as f64 / 1_000_000.0);
        debug!("Calculated a framerate of {} FPS", actual_fps);
        if (actual_fps - self.expected_chc_fps).abs() > self.chc_fps_tolerance {
            warn!(
                "FPS mismatch when synchronizing CHC data: actual {} instead of the expected {}",
                actual_fps, self.expected_chc_fps
            );
        }

        let spacing_us = div_round_half_even(length_us, count);
        let table = chc
            .frames
            .iter()
            .enumerate()
            .map(|(i, signals)| (micros(i as i64 * spacing_us), signals.clone()))
            .collect();
        Some(table)
    }
}

fn micros(us: i64) -> Duration {
    Duration::from_micros(us.max(0) as u64)
}

/// Integer division rounding ties to even, for positive operands.
fn div_round_half_even(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    let twice_remainder = 2 * (numerator % denominator);
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}
