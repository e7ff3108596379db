//! Cell values.
//!
//! Spreadsheet parsers hand over loosely-typed scalars. They are carried as a
//! closed sum type and every consumer converts explicitly through
//! [`CellValue::as_text`], [`CellValue::as_number`] or [`CellValue::as_date`].

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::dates;

/// A single cell of a record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum CellValue {
    /// Missing or empty cell
    #[default]
    Null,
    /// Text scalar
    Text(String),
    /// Numeric scalar
    Number(f64),
    /// Date scalar (spreadsheet dates carry no time zone)
    Date(NaiveDateTime),
}

impl CellValue {
    /// Creates a text cell.
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Returns true for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns true when the cell is null or its text form is blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Date(_) => false,
        }
    }

    /// String coercion: null becomes the empty string.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
            CellValue::Number(n) => Cow::Owned(format_number(*n)),
            CellValue::Date(d) => Cow::Owned(dates::format_date(d)),
        }
    }

    /// Numeric coercion. Only finite results are returned.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Date coercion through the general date parser.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Text(s) => dates::parse_date(s),
            _ => None,
        }
    }
}

/// Parses text as a finite real number.
///
/// Surrounding whitespace is ignored; the rest must parse completely.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    n.to_string()
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

impl From<JsonValue> for CellValue {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::Null => CellValue::Null,
            JsonValue::String(s) => CellValue::Text(s),
            JsonValue::Number(n) => n.as_f64().map_or(CellValue::Null, CellValue::Number),
            JsonValue::Bool(b) => CellValue::Text(b.to_string()),
            other @ (JsonValue::Array(_) | JsonValue::Object(_)) => {
                CellValue::Text(other.to_string())
            }
        }
    }
}

impl From<CellValue> for JsonValue {
    fn from(v: CellValue) -> Self {
        match v {
            CellValue::Null => JsonValue::Null,
            CellValue::Text(s) => JsonValue::String(s),
            CellValue::Number(n) => number_to_json(n),
            CellValue::Date(d) => JsonValue::String(dates::format_date(&d)),
        }
    }
}

/// Whole numbers inside the exactly-representable range go out as JSON
/// integers so `101` round-trips as `101`, not `101.0`.
fn number_to_json(n: f64) -> JsonValue {
    const EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() <= EXACT {
        return JsonValue::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}
