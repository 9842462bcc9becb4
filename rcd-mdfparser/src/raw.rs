//! Raw signal documents
//!
//! Two source formats feed the synchronizer:
//!
//! - **MDF**: frames stamped with presentation timestamps plus a chunk header
//!   (`chunkPts`, `chunkUtc`) that maps the pts clock onto UTC.
//! - **CHC**: camera health check output, a plain list of frames evenly spread
//!   over the recording.
//!
//! Both share the frame body: an `objectlist` whose entries carry
//! `boolAttributes`, `floatAttributes` and `integerAttributes` lists of
//! `{name, value}` pairs. Everything is validated here, so a
//! [`RawDocument`] that exists is always synchronizable.

use rcd_common::time::EPOCH_MILLIS_THRESHOLD;
use rcd_common::{SignalFrame, SignalValue};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which format a raw document is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Mdf,
    Chc,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mdf" => Ok(SourceKind::Mdf),
            "chc" => Ok(SourceKind::Chc),
            other => Err(format!("unknown source kind: {}", other)),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Mdf => f.write_str("mdf"),
            SourceKind::Chc => f.write_str("chc"),
        }
    }
}

/// Mapping of the chunk's pts clock onto UTC epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkAnchors {
    pub pts_start: i64,
    pub pts_end: i64,
    pub utc_start: i64,
    pub utc_end: i64,
}

impl ChunkAnchors {
    fn unit_micros(&self) -> i64 {
        if self.utc_start.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD as u64 {
            1_000
        } else {
            1_000_000
        }
    }

    fn start_micros(&self) -> Option<i64> {
        self.utc_start.checked_mul(self.unit_micros())
    }

    /// Offset in microseconds of a frame presentation timestamp from `origin_us`.
    ///
    /// The UTC anchors may be in seconds or milliseconds. The anchor offset is
    /// computed in integers and only the pts drift goes through `f64`, which
    /// keeps absolute epochs out of floating point. `None` when the offset
    /// does not fit in an `i64`.
    pub fn offset_micros(&self, pts: i64, origin_us: i64) -> Option<i64> {
        let unit_us = self.unit_micros();
        let utc_span = self.utc_end.checked_sub(self.utc_start)?;
        let pts_span = self.pts_end.checked_sub(self.pts_start)?;
        let factor = utc_span as f64 / pts_span as f64;

        let drift_us = (pts.checked_sub(self.pts_start)? as f64 * factor * unit_us as f64).round();
        if !drift_us.is_finite() || drift_us.abs() >= i64::MAX as f64 {
            return None;
        }
        self.start_micros()?
            .checked_sub(origin_us)?
            .checked_add(drift_us as i64)
    }
}

/// One MDF frame, already reduced to its signals
#[derive(Debug, Clone, PartialEq)]
pub struct MdfFrame {
    pub pts: i64,
    pub signals: SignalFrame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MdfDocument {
    pub anchors: ChunkAnchors,
    pub frames: Vec<MdfFrame>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChcDocument {
    pub frames: Vec<SignalFrame>,
}

/// A validated raw source
#[derive(Debug, Clone, PartialEq)]
pub enum RawDocument {
    Mdf(MdfDocument),
    Chc(ChcDocument),
}

impl RawDocument {
    /// Validate a decoded JSON document of the given kind.
    pub fn parse(kind: SourceKind, raw: &Value) -> Result<Self> {
        match kind {
            SourceKind::Mdf => parse_mdf(raw).map(RawDocument::Mdf),
            SourceKind::Chc => parse_chc(raw).map(RawDocument::Chc),
        }
    }

    /// Decode and validate raw bytes.
    pub fn from_slice(kind: SourceKind, bytes: &[u8]) -> Result<Self> {
        let raw: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::InvalidMdf(format!("{} document is not valid JSON: {}", kind, e)))?;
        Self::parse(kind, &raw)
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            RawDocument::Mdf(_) => SourceKind::Mdf,
            RawDocument::Chc(_) => SourceKind::Chc,
        }
    }
}

fn parse_mdf(raw: &Value) -> Result<MdfDocument> {
    let (Some(chunk_utc), Some(chunk_pts), Some(frames)) =
        (raw.get("chunkUtc"), raw.get("chunkPts"), raw.get("frame"))
    else {
        return Err(Error::InvalidMdf(
            "Missing either chunkPts, chunkUtc or frame fields.".to_string(),
        ));
    };

    let (Some(utc_start), Some(utc_end)) = (chunk_utc.get("utc_start"), chunk_utc.get("utc_end"))
    else {
        return Err(Error::InvalidMdf(
            "Missing either utc_start or utc_end in chunkUtc".to_string(),
        ));
    };

    let (Some(pts_start), Some(pts_end)) = (chunk_pts.get("pts_start"), chunk_pts.get("pts_end"))
    else {
        return Err(Error::InvalidMdf(
            "Missing either pts_start or pts_end in chunkPts".to_string(),
        ));
    };

    let anchors = ChunkAnchors {
        pts_start: integer(pts_start, "pts_start")?,
        pts_end: integer(pts_end, "pts_end")?,
        utc_start: integer(utc_start, "utc_start")?,
        utc_end: integer(utc_end, "utc_end")?,
    };
    if anchors.pts_end == anchors.pts_start {
        return Err(Error::InvalidMdf(format!(
            "Chunk pts range is empty (pts_start = pts_end = {})",
            anchors.pts_start
        )));
    }
    let in_range = anchors.utc_end.checked_sub(anchors.utc_start).is_some()
        && anchors.pts_end.checked_sub(anchors.pts_start).is_some()
        && anchors.start_micros().is_some();
    if !in_range {
        return Err(Error::InvalidMdf(format!(
            "Chunk anchors are out of range: {:?}",
            anchors
        )));
    }

    let frames = frame_list(frames)?
        .iter()
        .map(|frame| {
            let pts = frame
                .get("timestamp")
                .ok_or_else(|| Error::InvalidMdf("Frame without timestamp".to_string()))
                .and_then(|v| integer(v, "timestamp"))?;
            Ok(MdfFrame {
                pts,
                signals: frame_signals(frame)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MdfDocument { anchors, frames })
}

fn parse_chc(raw: &Value) -> Result<ChcDocument> {
    let frames = raw
        .get("frame")
        .ok_or_else(|| Error::InvalidMdf("Missing frame field in CHC output".to_string()))?;

    let frames = frame_list(frames)?
        .iter()
        .map(frame_signals)
        .collect::<Result<Vec<_>>>()?;

    Ok(ChcDocument { frames })
}

fn frame_list(value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::InvalidMdf("frame field is not a list".to_string()))
}

/// Collect every attribute of every object in the frame, later objects
/// overriding earlier ones on name clashes.
fn frame_signals(frame: &Value) -> Result<SignalFrame> {
    let mut signals = SignalFrame::new();
    let Some(objects) = frame.get("objectlist").and_then(Value::as_array) else {
        return Ok(signals);
    };

    for object in objects {
        for (name, value) in attributes(object, "boolAttributes") {
            signals.insert(name, SignalValue::Bool(is_true(value)));
        }
        for (name, value) in attributes(object, "floatAttributes") {
            signals.insert(name.clone(), SignalValue::Float(float(value, &name)?));
        }
        for (name, value) in attributes(object, "integerAttributes") {
            signals.insert(name.clone(), SignalValue::Int(integer(value, &name)?));
        }
    }
    Ok(signals)
}

/// `{name, value}` pairs of one attribute list; incomplete entries are skipped.
fn attributes<'a>(object: &'a Value, list: &str) -> impl Iterator<Item = (String, &'a Value)> + 'a {
    object
        .get(list)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|attr| {
            let name = match attr.get("name")? {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((name, attr.get("value")?))
        })
}

fn is_true(value: &Value) -> bool {
    match value {
        Value::String(s) => s == "true",
        Value::Bool(b) => *b,
        _ => false,
    }
}

fn float(value: &Value, name: &str) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::InvalidMdf(format!("{} is not a float: {}", name, value)))
}

fn integer(value: &Value, name: &str) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::InvalidMdf(format!("{} is not an integer: {}", name, value)))
}
