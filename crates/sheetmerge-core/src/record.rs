//! Records and record sets.
//!
//! A [`RecordSet`] owns an ordered header and rows whose cells are stored
//! positionally, one per header column. Column order is display order; no
//! engine operation ever reorders columns.

use std::collections::HashSet;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result, Side};
use crate::value::CellValue;

/// One data entry, aligned with the header of its record set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub values: Vec<CellValue>,
}

impl Row {
    pub fn new(values: Vec<CellValue>) -> Self {
        Self { values }
    }

    /// Returns the cell at `idx`, or null when out of range.
    pub fn get(&self, idx: usize) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.values.get(idx).unwrap_or(&NULL)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Into<CellValue>> FromIterator<T> for Row {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Row::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Header plus ordered rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSet {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl RecordSet {
    /// Creates a record set, checking that every row matches the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(Error::validation(
                "data",
                format!(
                    "row {} has {} cells but the header has {} columns",
                    idx,
                    row.len(),
                    headers.len()
                ),
            ));
        }
        Ok(Self { headers, rows })
    }

    /// Creates an empty record set with the given header.
    pub fn with_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a record set from JSON row objects.
    ///
    /// Without an explicit header, the header is the union of row keys in
    /// first-seen order. Keys missing from a row become null cells; keys not in
    /// an explicit header are ignored. A name repeated in an explicit header is
    /// a validation error.
    pub fn from_json_rows(
        headers: Option<Vec<String>>,
        objects: Vec<Map<String, JsonValue>>,
    ) -> Result<Self> {
        if let Some(headers) = &headers {
            if let Some(name) = first_duplicate(headers) {
                return Err(Error::validation(
                    "headers",
                    format!("column '{name}' appears more than once"),
                ));
            }
        }

        let headers = headers.unwrap_or_else(|| {
            let mut seen: Vec<String> = Vec::new();
            for object in &objects {
                for key in object.keys() {
                    if !seen.iter().any(|h| h == key) {
                        seen.push(key.clone());
                    }
                }
            }
            seen
        });

        let rows = objects
            .into_iter()
            .map(|mut object| {
                headers
                    .iter()
                    .map(|h| object.remove(h).map(CellValue::from).unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Self { headers, rows })
    }

    /// Converts rows back into JSON objects keyed by header, in header order.
    pub fn to_json_rows(&self) -> Vec<JsonValue> {
        self.rows
            .iter()
            .map(|row| {
                let object: Map<String, JsonValue> = self
                    .headers
                    .iter()
                    .zip(&row.values)
                    .map(|(h, v)| (h.clone(), JsonValue::from(v.clone())))
                    .collect();
                JsonValue::Object(object)
            })
            .collect()
    }

    /// Appends a row, checking its width.
    pub fn push(&mut self, row: Row) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(Error::validation(
                "data",
                format!(
                    "row has {} cells but the header has {} columns",
                    row.len(),
                    self.headers.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.headers, self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `column` in the header.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Like [`RecordSet::column_index`] but fails with a validation error.
    pub fn require_column(&self, column: &str, side: Side) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| Error::missing_column(side, column))
    }

    /// Returns the named cell of row `row`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r.get(idx))
    }

    /// Replaces the rows while keeping the header.
    ///
    /// Used by engines that only select or reorder rows of this set.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Self {
        Self {
            headers: self.headers.clone(),
            rows,
        }
    }

    /// Builds a record set without width checks. Callers guarantee alignment.
    pub(crate) fn from_parts_unchecked(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }
}

/// Returns the first name that occurs more than once in `names`.
pub(crate) fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
}

/// Serializes as an array of row objects keyed by header, in header order.
impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowObject {
                headers: &self.headers,
                row,
            })?;
        }
        seq.end()
    }
}

struct RowObject<'a> {
    headers: &'a [String],
    row: &'a Row,
}

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, value) in self.headers.iter().zip(&self.row.values) {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}
