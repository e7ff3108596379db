//! Date parsing and formatting for loosely-typed cells.
//!
//! Two entry points with different strictness:
//! - [`parse_date`] is the general parser used by date predicates.
//! - [`matches_calendar_pattern`] is the narrow pattern set used by type
//!   inference, so that free text only becomes a date column when it really
//!   looks like one.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// Date-time layouts tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

static CALENDAR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\d{4}-\d{1,2}-\d{1,2}$",
        r"^\d{1,2}/\d{1,2}/\d{4}$",
        r"^\d{1,2}-\d{1,2}-\d{4}$",
        r"^\d{4}/\d{1,2}/\d{1,2}$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("calendar pattern is valid"))
    .collect()
});

/// Parses a textual date or date-time.
///
/// Returns `None` for anything unrecognised, including impossible calendar
/// dates such as `2024-02-30`. RFC 3339 input keeps its wall-clock time and
/// the offset is dropped, so the calendar day is the one written.
pub fn parse_date(input: &str) -> Option<NaiveDateTime> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Returns true when `input` has one of the calendar layouts
/// `YYYY-MM-DD`, `MM/DD/YYYY`, `MM-DD-YYYY` or `YYYY/MM/DD` and names a real
/// date.
pub fn matches_calendar_pattern(input: &str) -> bool {
    let s = input.trim();
    CALENDAR_PATTERNS.iter().any(|re| re.is_match(s)) && parse_date(s).is_some()
}

/// Formats a date cell the way it is shown and exported.
///
/// Midnight values print as a plain date.
pub fn format_date(value: &NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}
