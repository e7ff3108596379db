//! Row sorting by a single column.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Result, Side};
use crate::record::RecordSet;
use crate::value::{parse_number, CellValue};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Precomputed ordering key of one cell.
///
/// Blank cells sort first, then numeric text in numeric order, then other text
/// in case-insensitive order. Two numeric cells, or two non-numeric cells,
/// compare exactly as a pairwise numeric-else-string comparison would, and the
/// key order is total, so mixed columns sort deterministically.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Empty,
    Number(f64),
    Text(String),
}

impl SortKey {
    pub fn of(cell: &CellValue) -> Self {
        let text = cell.as_text();
        if text.is_empty() {
            return SortKey::Empty;
        }
        match parse_number(&text) {
            Some(n) => SortKey::Number(n),
            None => SortKey::Text(text.to_lowercase()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Empty => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
        }
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Reorders the rows of `set` by `column`. Columns are never reordered.
///
/// With no column this is the identity. The sort is stable.
pub fn sort(set: &RecordSet, column: Option<&str>, direction: SortDirection) -> Result<RecordSet> {
    let Some(column) = column else {
        return Ok(set.clone());
    };
    let idx = set.require_column(column, Side::Dataset)?;

    let mut keyed: Vec<(SortKey, usize)> = set
        .rows()
        .iter()
        .enumerate()
        .map(|(pos, row)| (SortKey::of(row.get(idx)), pos))
        .collect();

    match direction {
        SortDirection::Asc => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
        SortDirection::Desc => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    let rows = keyed
        .into_iter()
        .map(|(_, pos)| set.rows()[pos].clone())
        .collect();
    Ok(set.with_rows(rows))
}
