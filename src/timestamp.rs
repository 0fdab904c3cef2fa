//! Epoch-seconds to display-string conversion.
//!
//! Report periods are rendered at a flat UTC offset (JST, +9h, unless
//! configured otherwise). No timezone database is consulted.

use chrono::{DateTime, FixedOffset};

/// Display value for any field missing from a report
pub const ABSENT_MARKER: &str = "N/A";

/// Default display offset in hours (Japan Standard Time)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts epoch seconds into `YYYY-MM-DD HH:MM:SS` at a fixed offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampNormalizer {
    offset_seconds: i32,
}

impl TimestampNormalizer {
    /// Create a normalizer for the given offset in hours.
    ///
    /// Returns `None` if the offset is outside of ±23 hours.
    pub fn new(offset_hours: i32) -> Option<Self> {
        let offset_seconds = offset_hours.checked_mul(3600)?;
        FixedOffset::east_opt(offset_seconds)?;
        Some(Self { offset_seconds })
    }

    /// Format a raw timestamp value taken from a report.
    ///
    /// Missing, blank, non-numeric and out-of-range inputs all collapse to
    /// [`ABSENT_MARKER`].
    pub fn format(&self, raw: Option<&str>) -> String {
        let offset = FixedOffset::east_opt(self.offset_seconds);
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(parse_epoch_seconds)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .zip(offset)
            .map(|(utc, offset)| {
                utc.with_timezone(&offset)
                    .format(DISPLAY_FORMAT)
                    .to_string()
            })
            .unwrap_or_else(|| ABSENT_MARKER.to_string())
    }
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self {
            offset_seconds: DEFAULT_UTC_OFFSET_HOURS * 3600,
        }
    }
}

/// Accept integral seconds, or a decimal value truncated toward zero
fn parse_epoch_seconds(s: &str) -> Option<i64> {
    if let Ok(secs) = s.parse::<i64>() {
        return Some(secs);
    }
    let value = s.parse::<f64>().ok()?;
    if !value.is_finite() || value.abs() > i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}
