//! Synchronized signal model
//!
//! A [`SignalTable`] maps offsets relative to the start of a recording to
//! sparse [`SignalFrame`]s. A field missing from a frame means "not observed
//! at that offset"; there is no explicit null. Tables are built once by a
//! synchronizer and then only read.
//!
//! The JSON form keys every frame by its offset written as `H:MM:SS[.ffffff]`
//! (see [`crate::time::format_timedelta`]), which is what previously stored
//! signal files use.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::time::{format_timedelta, parse_timedelta};

/// Scalar observed for one field in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl SignalValue {
    /// Numeric view of the value; booleans count as 1.0 / 0.0.
    pub fn as_f64(&self) -> f64 {
        match *self {
            SignalValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            SignalValue::Int(i) => i as f64,
            SignalValue::Float(f) => f,
        }
    }
}

impl From<bool> for SignalValue {
    fn from(value: bool) -> Self {
        SignalValue::Bool(value)
    }
}

impl From<i64> for SignalValue {
    fn from(value: i64) -> Self {
        SignalValue::Int(value)
    }
}

impl From<f64> for SignalValue {
    fn from(value: f64) -> Self {
        SignalValue::Float(value)
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Bool(b) => write!(f, "{}", b),
            SignalValue::Int(i) => write!(f, "{}", i),
            SignalValue::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Field name to value for a single offset
pub type SignalFrame = BTreeMap<String, SignalValue>;

/// Time-aligned signals of one recording, ordered by offset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalTable {
    frames: BTreeMap<Duration, SignalFrame>,
}

impl SignalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `frame` into the bucket at `offset`.
    ///
    /// Fields already present in the bucket are overwritten by the incoming
    /// frame; other fields are kept. Empty frames never create a bucket.
    pub fn merge_frame(&mut self, offset: Duration, frame: SignalFrame) {
        if frame.is_empty() {
            return;
        }
        self.frames.entry(offset).or_default().extend(frame);
    }

    /// Merge every bucket of `other` into this table, `other` winning per field.
    pub fn merge(&mut self, other: SignalTable) {
        for (offset, frame) in other.frames {
            self.merge_frame(offset, frame);
        }
    }

    pub fn get(&self, offset: &Duration) -> Option<&SignalFrame> {
        self.frames.get(offset)
    }

    /// Frames in ascending offset order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&Duration, &SignalFrame)> + ExactSizeIterator {
        self.frames.iter()
    }

    pub fn offsets(&self) -> impl DoubleEndedIterator<Item = &Duration> + ExactSizeIterator {
        self.frames.keys()
    }

    /// Values of `field` from every frame that carries it, in offset order.
    pub fn field_values<'a>(&'a self, field: &'a str) -> impl DoubleEndedIterator<Item = &'a SignalValue> + 'a {
        self.frames.values().filter_map(move |frame| frame.get(field))
    }

    /// Numeric values of `field`, see [`SignalValue::as_f64`].
    pub fn numeric_values(&self, field: &str) -> Vec<f64> {
        self.field_values(field).map(SignalValue::as_f64).collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn to_json_string(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl FromIterator<(Duration, SignalFrame)> for SignalTable {
    fn from_iter<I: IntoIterator<Item = (Duration, SignalFrame)>>(iter: I) -> Self {
        let mut table = SignalTable::new();
        for (offset, frame) in iter {
            table.merge_frame(offset, frame);
        }
        table
    }
}

impl Serialize for SignalTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.frames.len()))?;
        for (offset, frame) in &self.frames {
            map.serialize_entry(&format_timedelta(*offset), frame)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SignalTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = SignalTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of H:MM:SS offsets to signal frames")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SignalTable, A::Error> {
                let mut frames = BTreeMap::new();
                while let Some((key, frame)) = access.next_entry::<String, SignalFrame>()? {
                    let offset = parse_timedelta(&key).map_err(serde::de::Error::custom)?;
                    frames.insert(offset, frame);
                }
                Ok(SignalTable { frames })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}
