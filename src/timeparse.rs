//! Multi-format time parsing for schedule inputs.
//!
//! Inputs arrive as bare times ("10:00 AM"), case/space-irregular times
//! ("10:00am", "11:00 Pm"), or full date-times. Normalization runs first,
//! then a fixed ordered list of formats; the first successful parse wins.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::TimeParseError;

/// Accepted formats, tried in order.
const FORMATS: &[&str] = &[
    "%H:%M",             // 10:00
    "%I:%M %p",          // 10:00 AM
    "%Y-%m-%d %H:%M",    // 2026-01-30 09:00
    "%Y-%m-%d %I:%M %p", // 2026-01-30 09:00 AM
    "%d-%m-%Y %H:%M",    // 30-01-2026 09:00
];

/// Bare times (no date component) are resolved onto this anchor so that
/// same-day deltas between two bare times are exact. Matches strptime's
/// default date, which the prior implementation relied on.
fn anchor_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
}

/// Normalize case and spacing around a trailing meridiem marker:
/// "10:00am" -> "10:00 AM", "11:00 Pm" -> "11:00 PM".
///
/// Suffix detection splits `trimmed` itself, never an index computed on a
/// case-folded copy: Unicode lowercasing can change byte length, and a
/// mixed-origin index would slice mid-character on such input.
fn normalize(input: &str) -> String {
    let trimmed = input.trim();

    if let Some(split) = trimmed.len().checked_sub(2) {
        if trimmed.is_char_boundary(split) {
            let (head, tail) = trimmed.split_at(split);
            if tail.eq_ignore_ascii_case("am") || tail.eq_ignore_ascii_case("pm") {
                return format!("{} {}", head.trim_end(), tail.to_ascii_uppercase());
            }
        }
    }

    trimmed.to_string()
}

/// Parse a schedule time string into a `NaiveDateTime`.
///
/// Returns `TimeParseError` naming the offending input and the formats
/// attempted when nothing matches. Callers surface this as a stage-level
/// warning, not an abort.
pub fn parse_time(input: &str) -> Result<NaiveDateTime, TimeParseError> {
    let normalized = normalize(input);

    for fmt in FORMATS {
        // Date-bearing formats parse directly; bare-time formats need the
        // anchor date attached.
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Ok(dt);
        }
        if let Ok(t) = NaiveTime::parse_from_str(&normalized, fmt) {
            return Ok(anchor_date().and_time(t));
        }
    }

    Err(TimeParseError {
        input: input.to_string(),
        formats: FORMATS.to_vec(),
    })
}

/// Absolute distance in seconds between two parsed time strings.
pub fn delta_seconds(a: &NaiveDateTime, b: &NaiveDateTime) -> i64 {
    (*a - *b).num_seconds().abs()
}
