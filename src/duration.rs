//! Duration normalization and formatting.
//!
//! Durations reach the report in two shapes: raw seconds (JSON number from
//! the producer) or a pre-formatted string (`HH:MM:SS[.fff]`, or raw
//! milliseconds from older producers). Everything is normalized to
//! milliseconds before comparison so the sort engine never compares
//! formatted strings lexically.

use crate::DurationValue;
use regex::Regex;
use std::sync::OnceLock;

fn clock_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+):([0-5]?\d):([0-5]?\d)(?:\.(\d+))?$").expect("valid clock pattern")
    })
}

/// Normalize a duration value to milliseconds. Returns `None` when a text
/// value matches neither the clock form nor a bare number.
pub fn millis_of(value: &DurationValue) -> Option<f64> {
    match value {
        DurationValue::Seconds(secs) => Some(secs * 1000.0),
        DurationValue::Text(text) => parse_text_millis(text),
    }
}

fn parse_text_millis(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Some(caps) = clock_pattern().captures(text) {
        let hours: f64 = caps[1].parse().ok()?;
        let minutes: f64 = caps[2].parse().ok()?;
        let seconds: f64 = caps[3].parse().ok()?;
        let fraction: f64 = caps
            .get(4)
            .and_then(|m| format!("0.{}", m.as_str()).parse().ok())
            .unwrap_or(0.0);
        Some((hours * 3600.0 + minutes * 60.0 + seconds + fraction) * 1000.0)
    } else {
        // Bare numeric strings are raw milliseconds
        text.parse::<f64>().ok()
    }
}

/// Format milliseconds for display: `<n>ms` under one second, zero-padded
/// `HH:MM:SS` from one second up.
pub fn format_millis(ms: f64) -> String {
    if ms < 1000.0 {
        return format!("{}ms", ms.round() as i64);
    }
    let total_seconds = (ms / 1000.0).round() as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Display form of a duration value: already-formatted clock strings pass
/// through, everything parseable is formatted, anything else renders as-is.
pub fn display(value: &DurationValue) -> String {
    match value {
        DurationValue::Seconds(secs) => format_millis(secs * 1000.0),
        DurationValue::Text(text) => {
            if clock_pattern().is_match(text.trim()) {
                text.trim().to_string()
            } else if let Some(ms) = parse_text_millis(text) {
                format_millis(ms)
            } else {
                text.clone()
            }
        }
    }
}
