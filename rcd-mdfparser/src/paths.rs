//! Artifact path conventions
//!
//! Recording artifacts are named `<tenant>_<device>_<from>_<to>_<kind>.json`
//! where `<from>` and `<to>` are epoch milliseconds of at least 13 digits.

use crate::error::{Error, Result};

const MIN_TIMESTAMP_DIGITS: usize = 13;

const METADATA_SUFFIX: &str = "_metadata_full.json";
const SIGNALS_SUFFIX: &str = "_signals.json";
const PROCESSED_IMU_SUFFIX: &str = "_processed_imu.json";

/// Recording window embedded in an artifact path as `_<from>_<to>_`.
///
/// The first pair of consecutive underscore-delimited timestamps wins.
pub fn extract_timestamps(path: &str) -> Result<(i64, i64)> {
    let tokens: Vec<&str> = path.split('_').collect();
    // A pair must be enclosed by underscores, so it can neither start at the
    // first token nor end at the last one.
    let found = tokens
        .windows(2)
        .enumerate()
        .skip(1)
        .filter(|(i, _)| i + 2 < tokens.len())
        .find(|(_, pair)| pair.iter().all(|t| is_timestamp(t)));

    let invalid = || Error::InvalidFileName(format!("Cannot extract timestamps from filepath {:?}", path));
    let (_, pair) = found.ok_or_else(invalid)?;
    let from = pair[0].parse::<i64>().map_err(|_| invalid())?;
    let to = pair[1].parse::<i64>().map_err(|_| invalid())?;
    Ok((from, to))
}

fn is_timestamp(token: &str) -> bool {
    token.len() >= MIN_TIMESTAMP_DIGITS && token.bytes().all(|b| b.is_ascii_digit())
}

/// Where the synchronized signals of a metadata artifact are stored.
pub fn signals_path_for(metadata_path: &str) -> String {
    format!("{}{}", stem(metadata_path, METADATA_SUFFIX), SIGNALS_SUFFIX)
}

/// Where the resampled version of a raw IMU artifact is stored.
pub fn processed_imu_path_for(imu_path: &str) -> String {
    format!("{}{}", stem(imu_path, "_imu.json"), PROCESSED_IMU_SUFFIX)
}

fn stem<'a>(path: &'a str, kind_suffix: &str) -> &'a str {
    path.strip_suffix(kind_suffix)
        .or_else(|| path.strip_suffix(".json"))
        .unwrap_or(path)
}
