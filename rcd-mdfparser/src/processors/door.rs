use rcd_common::SignalTable;

use super::{overview, Processor, RecordingOverview};
use crate::error::Result;

const DOOR_CLOSED: &str = "DoorClosedConfidence";

/// Number of frames with a door closed detection, whatever its confidence
pub struct SumDoorClosed;

impl Processor for SumDoorClosed {
    fn name(&self) -> &'static str {
        "SumDoorClosed"
    }

    fn compute(&self, signals: &SignalTable) -> Result<RecordingOverview> {
        let closed = signals.field_values(DOOR_CLOSED).count();
        Ok(overview("sum_door_closed", closed as i64))
    }
}
