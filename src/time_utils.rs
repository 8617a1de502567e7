//! Timestamp and time-span helpers.
//!
//! Samples carry naive local timestamps (positioning datasets are recorded
//! in a single room clock), and thresholds are human-written spans such as
//! `"0:00:10"` or `"10 seconds"`.

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{Result, SegmentError};

/// Timestamp formats accepted on input, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d_%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Canonical output format for timestamps.
pub const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a timestamp in any of the supported formats.
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

/// Parse a time span.
///
/// Accepted forms:
/// - clock notation `H:MM:SS`, `MM:SS`, optionally with fractional seconds
///   and a leading `"N days "` prefix
/// - plain seconds, e.g. `"10"` or `"2.5"`
/// - a number with a unit suffix: `ms`, `s`/`sec`/`seconds`, `min`/`minutes`, `h`/`hours`
pub fn parse_duration(input: &str) -> Result<TimeDelta> {
    let invalid = |reason: &str| SegmentError::InvalidDurationThreshold {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty time span"));
    }

    let seconds = if trimmed.contains(':') {
        parse_clock_seconds(trimmed).ok_or_else(|| invalid("expected H:MM:SS"))?
    } else {
        parse_unit_seconds(trimmed)
            .ok_or_else(|| invalid("expected a number with an optional unit"))?
    };

    if !seconds.is_finite() {
        return Err(invalid("time span is not finite"));
    }
    if seconds < 0.0 {
        return Err(invalid("time span must not be negative"));
    }

    TimeDelta::try_milliseconds((seconds * 1000.0).round() as i64)
        .ok_or_else(|| invalid("time span out of range"))
}

fn parse_clock_seconds(input: &str) -> Option<f64> {
    let (days, clock) = match input.split_once("day") {
        Some((d, rest)) => {
            let days: f64 = d.trim().parse().ok()?;
            let rest = rest.trim_start_matches('s').trim();
            (days, rest)
        }
        None => (0.0, input),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (h, m, s) = match parts.as_slice() {
        [h, m, s] => (
            h.trim().parse::<f64>().ok()?,
            m.trim().parse::<f64>().ok()?,
            s.trim().parse::<f64>().ok()?,
        ),
        [m, s] => (
            0.0,
            m.trim().parse::<f64>().ok()?,
            s.trim().parse::<f64>().ok()?,
        ),
        _ => return None,
    };

    if m >= 60.0 || s >= 60.0 || h < 0.0 || m < 0.0 || s < 0.0 {
        return None;
    }
    Some(days * 86_400.0 + h * 3600.0 + m * 60.0 + s)
}

fn parse_unit_seconds(input: &str) -> Option<f64> {
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);
    let value: f64 = number.trim().parse().ok()?;

    let scale = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "ms" | "millis" | "milliseconds" => 0.001,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600.0,
        _ => return None,
    };
    Some(value * scale)
}

/// Format a span as `H:MM:SS`, with milliseconds appended when non-zero.
pub fn format_duration(delta: TimeDelta) -> String {
    let sign = if delta < TimeDelta::zero() { "-" } else { "" };
    let total_ms = delta.num_milliseconds().unsigned_abs();
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    if ms == 0 {
        format!("{sign}{h}:{m:02}:{s:02}")
    } else {
        format!("{sign}{h}:{m:02}:{s:02}.{ms:03}")
    }
}

/// A span expressed as fractional seconds.
pub fn delta_seconds(delta: TimeDelta) -> f64 {
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}

/// Serde adapter for sample timestamps: lenient on input, canonical on output.
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{TIMESTAMP_OUTPUT_FORMAT, parse_timestamp};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&ts.format(TIMESTAMP_OUTPUT_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp '{raw}'")))
    }
}
