//! Composite-key join of a primary record set against a reference set.
//!
//! The reference side is indexed into buckets keyed by a normalised composite
//! key (trimmed, lowercased cell text joined by [`KEY_SEPARATOR`]). Every
//! primary row is probed against the index; a key with several reference rows
//! fans out into one output row per reference row, in reference order.
//!
//! The output header is the primary header followed by every reference column
//! prefixed with [`REF_PREFIX`]. Names are never deduplicated or renamed; a
//! join whose combined header would repeat a name (a primary `ref_id` next to
//! a reference `id`) is rejected, so a primary value is never shadowed by a
//! reference value.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, Side};
use crate::record::{first_duplicate, RecordSet, Row};
use crate::value::CellValue;

/// Prefix added to reference column names in join output.
pub const REF_PREFIX: &str = "ref_";

/// Separator between key components; does not occur in spreadsheet text.
pub const KEY_SEPARATOR: &str = "\u{1f}|\u{1f}";

/// A pair of columns matched by value across the two sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyColumnPair {
    pub reference_column: String,
    pub primary_column: String,
}

impl KeyColumnPair {
    pub fn new(reference_column: impl Into<String>, primary_column: impl Into<String>) -> Self {
        Self {
            reference_column: reference_column.into(),
            primary_column: primary_column.into(),
        }
    }

    /// Same column name on both sides.
    pub fn same(column: impl Into<String>) -> Self {
        let column = column.into();
        Self::new(column.clone(), column)
    }
}

/// Join semantics for unmatched primary rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    /// Drop unmatched primary rows
    #[default]
    Inner,
    /// Keep unmatched primary rows with null reference cells
    Left,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "inner"),
            JoinType::Left => write!(f, "left"),
        }
    }
}

/// Optional limits applied while joining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinLimits {
    /// Maximum number of output rows before the join aborts
    pub max_rows: Option<usize>,
}

/// Join output plus match statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    /// Merged rows under the combined header
    pub result: RecordSet,
    /// Distinct composite keys that matched at least one primary row
    pub matched_keys: usize,
    /// Primary rows without any reference match
    pub unmatched_primary_rows: usize,
}

/// Builds the normalised composite key of `row` from the given column positions.
pub fn composite_key(row: &Row, columns: &[usize]) -> String {
    let mut key = String::new();
    for (i, &idx) in columns.iter().enumerate() {
        if i > 0 {
            key.push_str(KEY_SEPARATOR);
        }
        key.push_str(&row.get(idx).as_text().trim().to_lowercase());
    }
    key
}

/// Hash index over reference rows, one bucket per composite key.
#[derive(Debug)]
pub struct JoinIndex<'a> {
    buckets: HashMap<String, Vec<&'a Row>>,
}

impl<'a> JoinIndex<'a> {
    /// Indexes `rows` on the given column positions, preserving row order
    /// inside each bucket.
    pub fn build(rows: &'a [Row], columns: &[usize]) -> Self {
        let mut buckets: HashMap<String, Vec<&'a Row>> = HashMap::new();
        for row in rows {
            buckets
                .entry(composite_key(row, columns))
                .or_default()
                .push(row);
        }
        Self { buckets }
    }

    pub fn get(&self, key: &str) -> Option<&[&'a Row]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Output header of a join: primary columns, then prefixed reference columns.
pub fn joined_headers(primary: &[String], reference: &[String]) -> Vec<String> {
    primary
        .iter()
        .cloned()
        .chain(reference.iter().map(|h| format!("{REF_PREFIX}{h}")))
        .collect()
}

/// Validates key pairs and the combined header of a join.
///
/// Returns the key column positions as `(primary, reference)`. Only headers
/// are inspected, so this can run before the reference set is filtered.
pub fn check_join_columns(
    primary: &RecordSet,
    reference: &RecordSet,
    key_pairs: &[KeyColumnPair],
) -> Result<(Vec<usize>, Vec<usize>)> {
    if key_pairs.is_empty() {
        return Err(Error::validation(
            "keyColumns",
            "at least one key column pair is required",
        ));
    }

    let mut primary_columns = Vec::with_capacity(key_pairs.len());
    let mut reference_columns = Vec::with_capacity(key_pairs.len());
    for pair in key_pairs {
        reference_columns.push(reference.require_column(&pair.reference_column, Side::Reference)?);
        primary_columns.push(primary.require_column(&pair.primary_column, Side::Primary)?);
    }

    let headers = joined_headers(primary.headers(), reference.headers());
    if let Some(name) = first_duplicate(&headers) {
        return Err(Error::validation(
            "headers",
            format!("joined output would contain column '{name}' more than once"),
        ));
    }

    Ok((primary_columns, reference_columns))
}

/// Joins `primary` against the (already filtered) `reference` set.
pub fn join(
    primary: &RecordSet,
    reference: &RecordSet,
    key_pairs: &[KeyColumnPair],
    join_type: JoinType,
) -> Result<JoinOutcome> {
    join_with_limits(primary, reference, key_pairs, join_type, JoinLimits::default())
}

/// [`join`] with an output row cap.
pub fn join_with_limits(
    primary: &RecordSet,
    reference: &RecordSet,
    key_pairs: &[KeyColumnPair],
    join_type: JoinType,
    limits: JoinLimits,
) -> Result<JoinOutcome> {
    let (primary_columns, reference_columns) = check_join_columns(primary, reference, key_pairs)?;

    if primary.is_empty() {
        return Err(Error::EmptyDataset { side: Side::Primary });
    }
    if reference.is_empty() {
        return Err(Error::EmptyDataset {
            side: Side::Reference,
        });
    }

    let index = JoinIndex::build(reference.rows(), &reference_columns);
    let reference_width = reference.headers().len();

    let mut rows: Vec<Row> = Vec::new();
    let mut matched: HashSet<String> = HashSet::new();
    let mut unmatched_primary_rows = 0;

    for primary_row in primary.rows() {
        let key = composite_key(primary_row, &primary_columns);
        match index.get(&key) {
            Some(bucket) => {
                ensure_capacity(&mut rows, bucket.len(), limits)?;
                for reference_row in bucket {
                    rows.push(merge(primary_row, reference_row.values.iter().cloned()));
                }
                matched.insert(key);
            }
            None => {
                unmatched_primary_rows += 1;
                if join_type == JoinType::Left {
                    ensure_capacity(&mut rows, 1, limits)?;
                    rows.push(merge(
                        primary_row,
                        std::iter::repeat(CellValue::Null).take(reference_width),
                    ));
                }
            }
        }
    }

    Ok(JoinOutcome {
        result: RecordSet::from_parts_unchecked(
            joined_headers(primary.headers(), reference.headers()),
            rows,
        ),
        matched_keys: matched.len(),
        unmatched_primary_rows,
    })
}

fn merge(primary: &Row, reference: impl Iterator<Item = CellValue>) -> Row {
    let mut values = primary.values.clone();
    values.extend(reference);
    Row::new(values)
}

fn ensure_capacity(rows: &mut Vec<Row>, additional: usize, limits: JoinLimits) -> Result<()> {
    if let Some(max) = limits.max_rows {
        if rows.len() + additional > max {
            return Err(Error::ResourceExhausted(format!(
                "join would produce more than {max} rows; filter the reference data or narrow the key columns"
            )));
        }
    }
    rows.try_reserve(additional)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> RecordSet {
        RecordSet::new(
            vec!["id".into(), "region".into()],
            vec![Row::from_iter(["A1", "East"])],
        )
        .unwrap()
    }

    fn primary() -> RecordSet {
        RecordSet::new(
            vec!["id".into(), "name".into()],
            vec![Row::from_iter(["a1", "Bob"]), Row::from_iter(["B2", "Sue"])],
        )
        .unwrap()
    }

    #[test]
    fn test_inner_join_drops_unmatched() {
        let out = join(&primary(), &reference(), &[KeyColumnPair::same("id")], JoinType::Inner)
            .unwrap();
        assert_eq!(out.result.headers(), ["id", "name", "ref_id", "ref_region"]);
        assert_eq!(out.result.len(), 1);
        assert_eq!(
            out.result.rows()[0],
            Row::from_iter(["a1", "Bob", "A1", "East"])
        );
        assert_eq!(out.matched_keys, 1);
        assert_eq!(out.unmatched_primary_rows, 1);
    }

    #[test]
    fn test_left_join_fills_nulls() {
        let out = join(&primary(), &reference(), &[KeyColumnPair::same("id")], JoinType::Left)
            .unwrap();
        assert_eq!(out.result.len(), 2);
        assert_eq!(out.result.cell(1, "name"), Some(&CellValue::text("Sue")));
        assert_eq!(out.result.cell(1, "ref_id"), Some(&CellValue::Null));
        assert_eq!(out.result.cell(1, "ref_region"), Some(&CellValue::Null));
    }

    #[test]
    fn test_key_normalisation() {
        let key_a = composite_key(&Row::from_iter(["ABC "]), &[0]);
        let key_b = composite_key(&Row::from_iter(["abc"]), &[0]);
        assert_eq!(key_a, key_b);
        assert_eq!(
            composite_key(&Row::new(vec![CellValue::Null]), &[0]),
            composite_key(&Row::from_iter(["  "]), &[0])
        );
        assert_eq!(composite_key(&Row::new(vec![CellValue::Number(7.0)]), &[0]), "7");
    }

    #[test]
    fn test_composite_keys_do_not_collide_on_concatenation() {
        let a = composite_key(&Row::from_iter(["ab", "c"]), &[0, 1]);
        let b = composite_key(&Row::from_iter(["a", "bc"]), &[0, 1]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fan_out_keeps_reference_order() {
        let reference = RecordSet::new(
            vec!["sku".into(), "store".into()],
            vec![
                Row::from_iter(["X", "north"]),
                Row::from_iter(["Y", "east"]),
                Row::from_iter(["x", "south"]),
            ],
        )
        .unwrap();
        let primary = RecordSet::new(
            vec!["code".into()],
            vec![Row::from_iter(["x"]), Row::from_iter(["X "])],
        )
        .unwrap();

        let out = join(
            &primary,
            &reference,
            &[KeyColumnPair::new("sku", "code")],
            JoinType::Inner,
        )
        .unwrap();
        let stores: Vec<_> = out
            .result
            .rows()
            .iter()
            .map(|r| r.get(2).as_text().into_owned())
            .collect();
        assert_eq!(stores, ["north", "south", "north", "south"]);
        assert_eq!(out.matched_keys, 1);
    }

    #[test]
    fn test_colliding_names_are_prefixed_not_merged() {
        let reference = RecordSet::new(
            vec!["id".into(), "name".into()],
            vec![Row::from_iter(["1", "from reference"])],
        )
        .unwrap();
        let primary = RecordSet::new(
            vec!["id".into(), "name".into()],
            vec![Row::from_iter(["1", "from primary"])],
        )
        .unwrap();
        let out = join(&primary, &reference, &[KeyColumnPair::same("id")], JoinType::Inner)
            .unwrap();
        assert_eq!(out.result.cell(0, "name"), Some(&CellValue::text("from primary")));
        assert_eq!(
            out.result.cell(0, "ref_name"),
            Some(&CellValue::text("from reference"))
        );
    }

    #[test]
    fn test_prefixed_name_clash_is_rejected() {
        let primary = RecordSet::new(
            vec!["id".into(), "ref_id".into()],
            vec![Row::from_iter(["a1", "PRIMARY"])],
        )
        .unwrap();
        let err = join(&primary, &reference(), &[KeyColumnPair::same("id")], JoinType::Left)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "headers"));
        assert!(err.to_string().contains("'ref_id'"));

        // A primary `ref_` column with no reference counterpart is fine
        let primary = RecordSet::new(
            vec!["id".into(), "ref_code".into()],
            vec![Row::from_iter(["a1", "PRIMARY"])],
        )
        .unwrap();
        let out = join(&primary, &reference(), &[KeyColumnPair::same("id")], JoinType::Left)
            .unwrap();
        assert_eq!(out.result.cell(0, "ref_code"), Some(&CellValue::text("PRIMARY")));
    }

    #[test]
    fn test_missing_key_column_names_side() {
        let err = join(
            &primary(),
            &reference(),
            &[KeyColumnPair::new("id", "customer")],
            JoinType::Inner,
        )
        .unwrap_err();
        assert_eq!(err, Error::missing_column(Side::Primary, "customer"));

        let err = join(
            &primary(),
            &reference(),
            &[KeyColumnPair::new("code", "id")],
            JoinType::Inner,
        )
        .unwrap_err();
        assert_eq!(err, Error::missing_column(Side::Reference, "code"));
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        let empty = RecordSet::with_headers(["id"]);
        assert_eq!(
            join(&empty, &reference(), &[KeyColumnPair::same("id")], JoinType::Left).unwrap_err(),
            Error::EmptyDataset { side: Side::Primary }
        );
        assert_eq!(
            join(&primary(), &empty, &[KeyColumnPair::same("id")], JoinType::Left).unwrap_err(),
            Error::EmptyDataset {
                side: Side::Reference
            }
        );
        assert!(join(&primary(), &reference(), &[], JoinType::Inner)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_row_cap_reports_resource_exhaustion() {
        let limits = JoinLimits { max_rows: Some(1) };
        let err = join_with_limits(
            &primary(),
            &reference(),
            &[KeyColumnPair::same("id")],
            JoinType::Left,
            limits,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ResourceExhausted(_)));
    }
}
