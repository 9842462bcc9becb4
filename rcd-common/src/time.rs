//! Timestamp utilities
//!
//! Devices report epochs either in seconds or in milliseconds, and signal
//! offsets are persisted using the `H:MM:SS[.ffffff]` duration notation that
//! existing stored signal files were written with. Both conversions live here.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::{Error, Result};

/// Epoch values at or above this are interpreted as milliseconds.
///
/// 10^11 seconds is roughly the year 5138, while 10^11 milliseconds is 1973,
/// so every realistic device timestamp falls clearly on one side.
pub const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

const MICROS_PER_SECOND: u64 = 1_000_000;
const SECONDS_PER_DAY: u64 = 86_400;

/// Normalize an epoch given in seconds or milliseconds to microseconds.
///
/// `None` when the result does not fit in an `i64`.
pub fn epoch_to_micros(epoch: i64) -> Option<i64> {
    if epoch.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD as u64 {
        epoch.checked_mul(1_000)
    } else {
        epoch.checked_mul(1_000_000)
    }
}

/// Interpret an epoch in milliseconds as a UTC instant.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Format a duration the way stored signal files key their frames.
///
/// Hours carry no padding, minutes and seconds are two digits, and the
/// fractional part is six digits when present. Offsets of a day or more get
/// a `N day, ` / `N days, ` prefix.
///
/// ```
/// use std::time::Duration;
/// use rcd_common::time::format_timedelta;
///
/// assert_eq!(format_timedelta(Duration::from_secs(5)), "0:00:05");
/// assert_eq!(format_timedelta(Duration::from_millis(3_723_500)), "1:02:03.500000");
/// ```
pub fn format_timedelta(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let micros = duration.subsec_micros();

    let days = total_secs / SECONDS_PER_DAY;
    let rem = total_secs % SECONDS_PER_DAY;
    let hours = rem / 3600;
    let mins = (rem % 3600) / 60;
    let secs = rem % 60;

    let mut out = String::new();
    if days > 0 {
        let unit = if days == 1 { "day" } else { "days" };
        out.push_str(&format!("{} {}, ", days, unit));
    }
    out.push_str(&format!("{}:{:02}:{:02}", hours, mins, secs));
    if micros != 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}

/// Parse the `[N day[s], ]H:MM:SS[.ffffff]` notation back into a duration.
///
/// Fractions shorter than six digits are accepted and right-padded.
pub fn parse_timedelta(text: &str) -> Result<Duration> {
    let invalid = || Error::InvalidInput(format!("Invalid duration string: {:?}", text));

    let (days, clock) = match text.split_once(", ") {
        Some((day_part, clock)) => {
            let count = day_part
                .strip_suffix(" days")
                .or_else(|| day_part.strip_suffix(" day"))
                .ok_or_else(invalid)?;
            (count.trim().parse::<u64>().map_err(|_| invalid())?, clock)
        }
        None => (0, text),
    };

    let mut parts = clock.split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let hours: u64 = h.parse().map_err(|_| invalid())?;
    let mins: u64 = m.parse().map_err(|_| invalid())?;
    if m.len() != 2 || mins >= 60 {
        return Err(invalid());
    }

    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (s, None),
    };
    let secs: u64 = whole.parse().map_err(|_| invalid())?;
    if whole.len() != 2 || secs >= 60 {
        return Err(invalid());
    }

    let micros = match fraction {
        Some(f) if !f.is_empty() && f.len() <= 6 && f.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{:0<6}", f).parse::<u64>().map_err(|_| invalid())?
        }
        Some(_) => return Err(invalid()),
        None => 0,
    };

    let total_micros = days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|d| hours.checked_mul(3600)?.checked_add(d))
        .and_then(|s| s.checked_add(mins * 60 + secs))
        .and_then(|s| s.checked_mul(MICROS_PER_SECOND))
        .and_then(|us| us.checked_add(micros))
        .ok_or_else(invalid)?;
    Ok(Duration::from_micros(total_micros))
}
