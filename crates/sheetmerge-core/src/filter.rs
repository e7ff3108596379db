//! Composite filtering.
//!
//! Conditions are combined with a single AND/OR operator and applied to every
//! row. Row order is preserved; filtering only drops rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::predicate::{FilterCondition, Predicate};
use crate::record::{RecordSet, Row};

/// How multiple conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogicOperator {
    /// Every condition must hold
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    /// At least one condition must hold
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicOperator::And => write!(f, "AND"),
            LogicOperator::Or => write!(f, "OR"),
        }
    }
}

/// A list of compiled predicates joined by one operator.
#[derive(Debug, Clone)]
pub struct Combinator {
    predicates: Vec<Predicate>,
    operator: LogicOperator,
}

impl Combinator {
    /// Compiles `conditions` against `headers`.
    pub fn compile(
        headers: &[String],
        conditions: &[FilterCondition],
        operator: LogicOperator,
    ) -> Self {
        Self {
            predicates: conditions
                .iter()
                .map(|c| Predicate::compile(headers, c))
                .collect(),
            operator,
        }
    }

    /// An empty combinator matches every row.
    pub fn matches(&self, row: &Row) -> bool {
        if self.predicates.is_empty() {
            return true;
        }
        match self.operator {
            LogicOperator::And => self.predicates.iter().all(|p| p.evaluate(row)),
            LogicOperator::Or => self.predicates.iter().any(|p| p.evaluate(row)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Returns true when `row` satisfies `conditions` under `operator`.
pub fn matches(
    headers: &[String],
    row: &Row,
    conditions: &[FilterCondition],
    operator: LogicOperator,
) -> bool {
    Combinator::compile(headers, conditions, operator).matches(row)
}

/// Keeps the rows of `set` that satisfy `conditions`, in their original order.
///
/// With no conditions the input is returned unchanged.
pub fn filter(
    set: &RecordSet,
    conditions: &[FilterCondition],
    operator: LogicOperator,
) -> Result<RecordSet> {
    if conditions.is_empty() {
        return Ok(set.clone());
    }

    let combinator = Combinator::compile(set.headers(), conditions, operator);
    let mut rows = Vec::new();
    for row in set.rows() {
        if combinator.matches(row) {
            rows.try_reserve(1)?;
            rows.push(row.clone());
        }
    }
    Ok(set.with_rows(rows))
}

/// Owned variant of [`filter`] that moves matching rows instead of cloning.
pub fn filter_owned(
    set: RecordSet,
    conditions: &[FilterCondition],
    operator: LogicOperator,
) -> Result<RecordSet> {
    if conditions.is_empty() {
        return Ok(set);
    }

    let combinator = Combinator::compile(set.headers(), conditions, operator);
    let (headers, all_rows) = set.into_parts();
    let mut rows = Vec::new();
    for row in all_rows {
        if combinator.matches(&row) {
            rows.try_reserve(1)?;
            rows.push(row);
        }
    }
    Ok(RecordSet::from_parts_unchecked(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;

    fn people() -> RecordSet {
        RecordSet::new(
            vec!["name".into(), "age".into(), "note".into()],
            vec![
                Row::from_iter(["Alice", "34", ""]),
                Row::from_iter(["Bob", "19", "vip"]),
                Row::from_iter(["Carol", "52", "   "]),
                Row::new(vec!["Dan".into(), "n/a".into(), CellValue::Null]),
            ],
        )
        .unwrap()
    }

    fn names(set: &RecordSet) -> Vec<String> {
        set.rows().iter().map(|r| r.get(0).as_text().into_owned()).collect()
    }

    #[test]
    fn test_empty_conditions_return_input() {
        let set = people();
        assert_eq!(filter(&set, &[], LogicOperator::And).unwrap(), set);
    }

    #[test]
    fn test_and_requires_all() {
        let conditions = vec![
            FilterCondition::new("age", "greaterThan", "20"),
            FilterCondition::new("note", "isEmpty", ""),
        ];
        let out = filter(&people(), &conditions, LogicOperator::And).unwrap();
        assert_eq!(names(&out), ["Alice", "Carol"]);
    }

    #[test]
    fn test_or_requires_any_and_keeps_order() {
        let conditions = vec![
            FilterCondition::new("name", "exactMatch", "Dan"),
            FilterCondition::new("note", "contains", "VIP"),
        ];
        let out = filter(&people(), &conditions, LogicOperator::Or).unwrap();
        assert_eq!(names(&out), ["Bob", "Dan"]);
        assert_eq!(out.headers(), people().headers());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let conditions = vec![FilterCondition::new("age", "lessThan", "40")];
        let once = filter(&people(), &conditions, LogicOperator::And).unwrap();
        let twice = filter(&once, &conditions, LogicOperator::And).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_owned_matches_filter() {
        let conditions = vec![FilterCondition::new("age", "notEquals", "19")];
        let borrowed = filter(&people(), &conditions, LogicOperator::And).unwrap();
        let owned = filter_owned(people(), &conditions, LogicOperator::And).unwrap();
        assert_eq!(borrowed, owned);
        assert_eq!(names(&owned), ["Alice", "Carol", "Dan"]);
    }

    #[test]
    fn test_operator_wire_names() {
        let op: LogicOperator = serde_json::from_str("\"OR\"").unwrap();
        assert_eq!(op, LogicOperator::Or);
        let op: LogicOperator = serde_json::from_str("\"and\"").unwrap();
        assert_eq!(op, LogicOperator::And);
        assert_eq!(serde_json::to_string(&LogicOperator::And).unwrap(), "\"AND\"");
    }
}
