//! Column type inference.
//!
//! Each header column is classified from a bounded, evenly spaced sample of
//! its non-empty cells. The column gets the plurality type of the sample, with
//! ties resolved toward number, then date, then text.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::dates;
use crate::record::RecordSet;
use crate::value::{parse_number, CellValue};

/// Inferred column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Free text
    Text,
    /// Real numbers
    Number,
    /// Calendar dates
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Upper bound on sampled rows per column
    pub sample_size: usize,
    /// Row count above which the fractional budget applies
    pub large_set_threshold: usize,
    /// Fraction of rows sampled for large sets
    pub large_set_fraction: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            large_set_threshold: 100_000,
            large_set_fraction: 0.005,
        }
    }
}

impl InferenceConfig {
    /// Number of rows to visit for a set of `total_rows` rows.
    pub fn row_budget(&self, total_rows: usize) -> usize {
        if total_rows > self.large_set_threshold {
            let fractional = (total_rows as f64 * self.large_set_fraction).ceil() as usize;
            self.sample_size.min(fractional.max(1))
        } else {
            self.sample_size.min(total_rows)
        }
    }
}

/// Column name to inferred type, in header order.
///
/// Built once per record set and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnTypeMap {
    entries: Vec<(String, ColumnType)>,
}

impl ColumnTypeMap {
    pub fn get(&self, column: &str) -> Option<ColumnType> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, ty)| *ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.entries.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ColumnTypeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, ty) in &self.entries {
            map.serialize_entry(name, ty)?;
        }
        map.end()
    }
}

/// Classifies a single cell. Blank cells have no type.
///
/// Pure; usable whenever a type must be determined ad hoc.
pub fn classify(value: &CellValue) -> Option<ColumnType> {
    match value {
        v if v.is_blank() => None,
        CellValue::Date(_) => Some(ColumnType::Date),
        CellValue::Number(_) => Some(ColumnType::Number),
        CellValue::Text(s) => {
            if dates::matches_calendar_pattern(s) {
                Some(ColumnType::Date)
            } else if parse_number(s).is_some() {
                Some(ColumnType::Number)
            } else {
                Some(ColumnType::Text)
            }
        }
        CellValue::Null => None,
    }
}

/// Picks the plurality type of a sample of classified values.
pub fn plurality<I>(types: I) -> ColumnType
where
    I: IntoIterator<Item = ColumnType>,
{
    let (mut numbers, mut dates, mut texts) = (0usize, 0usize, 0usize);
    for ty in types {
        match ty {
            ColumnType::Number => numbers += 1,
            ColumnType::Date => dates += 1,
            ColumnType::Text => texts += 1,
        }
    }

    if numbers + dates + texts == 0 {
        ColumnType::Text
    } else if numbers >= dates && numbers >= texts {
        ColumnType::Number
    } else if dates >= texts {
        ColumnType::Date
    } else {
        ColumnType::Text
    }
}

/// Infers a type for every header column of `set`.
pub fn infer_types(set: &RecordSet, config: &InferenceConfig) -> ColumnTypeMap {
    let budget = config.row_budget(set.len());
    // Ceiling stride so the last sampled row reaches the tail of the set
    let stride = if budget == 0 {
        1
    } else {
        set.len().div_ceil(budget).max(1)
    };

    let entries = set
        .headers()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let sample = set
                .rows()
                .iter()
                .step_by(stride)
                .take(budget)
                .filter_map(|row| classify(row.get(idx)));
            (name.clone(), plurality(sample))
        })
        .collect();

    ColumnTypeMap { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;

    fn single_column(values: Vec<CellValue>) -> RecordSet {
        let rows = values.into_iter().map(|v| Row::new(vec![v])).collect();
        RecordSet::new(vec!["col".into()], rows).unwrap()
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify(&CellValue::Null), None);
        assert_eq!(classify(&CellValue::text("   ")), None);
        assert_eq!(classify(&CellValue::Number(1.0)), Some(ColumnType::Number));
        assert_eq!(classify(&CellValue::text("2024-01-01")), Some(ColumnType::Date));
        assert_eq!(classify(&CellValue::text("12/31/2023")), Some(ColumnType::Date));
        assert_eq!(classify(&CellValue::text("3.5")), Some(ColumnType::Number));
        assert_eq!(classify(&CellValue::text("2024")), Some(ColumnType::Number));
        assert_eq!(classify(&CellValue::text("2024-02-31")), Some(ColumnType::Text));
        assert_eq!(classify(&CellValue::text("hello")), Some(ColumnType::Text));
    }

    #[test]
    fn test_mixed_numeric_column_is_number() {
        let set = single_column(vec![
            CellValue::Number(1.0),
            CellValue::Number(2.0),
            CellValue::text("3"),
            CellValue::text(""),
        ]);
        assert_eq!(
            infer_types(&set, &InferenceConfig::default()).get("col"),
            Some(ColumnType::Number)
        );
    }

    #[test]
    fn test_iso_dates_column_is_date() {
        let set = single_column(vec![
            CellValue::text("2024-01-01"),
            CellValue::text("2024-02-02"),
        ]);
        assert_eq!(
            infer_types(&set, &InferenceConfig::default()).get("col"),
            Some(ColumnType::Date)
        );
    }

    #[test]
    fn test_ties_prefer_number_then_date() {
        use ColumnType::*;
        assert_eq!(plurality([Number, Date]), Number);
        assert_eq!(plurality([Date, Text]), Date);
        assert_eq!(plurality([Text, Number, Date]), Number);
        assert_eq!(plurality([Text, Text, Number]), Text);
        assert_eq!(plurality([]), Text);
    }

    #[test]
    fn test_all_empty_column_defaults_to_text() {
        let set = single_column(vec![CellValue::Null, CellValue::text("")]);
        assert_eq!(
            infer_types(&set, &InferenceConfig::default()).get("col"),
            Some(ColumnType::Text)
        );
    }

    #[test]
    fn test_row_budget() {
        let config = InferenceConfig::default();
        assert_eq!(config.row_budget(0), 0);
        assert_eq!(config.row_budget(10), 10);
        assert_eq!(config.row_budget(50_000), 1000);
        assert_eq!(config.row_budget(120_000), 600);
        assert_eq!(config.row_budget(5_000_000), 1000);
    }

    #[test]
    fn test_sample_spans_whole_set() {
        // Text rows first, numbers after; an evenly spaced sample sees both.
        let mut values = vec![CellValue::text("n/a"); 400];
        values.extend((0..1600).map(|n| CellValue::Number(n as f64)));
        let config = InferenceConfig {
            sample_size: 100,
            ..Default::default()
        };
        let types = infer_types(&single_column(values), &config);
        assert_eq!(types.get("col"), Some(ColumnType::Number));
    }

    #[test]
    fn test_sample_reaches_tail_just_over_budget() {
        // 1999 rows against a budget of 1000: the numeric second half must be
        // visited as often as the text first half.
        let mut values = vec![CellValue::text("n/a"); 1000];
        values.extend((0..999).map(|n| CellValue::Number(n as f64)));
        let set = single_column(values);
        let config = InferenceConfig::default();
        assert_eq!(config.row_budget(set.len()), 1000);
        assert_eq!(infer_types(&set, &config).get("col"), Some(ColumnType::Number));
    }

    #[test]
    fn test_map_serializes_in_header_order() {
        let set = RecordSet::new(
            vec!["b".into(), "a".into()],
            vec![Row::from_iter(["x", "1"])],
        )
        .unwrap();
        let json = serde_json::to_string(&infer_types(&set, &InferenceConfig::default())).unwrap();
        assert_eq!(json, r#"{"b":"text","a":"number"}"#);
    }
}
