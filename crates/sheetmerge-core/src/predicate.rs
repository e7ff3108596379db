//! Predicate evaluation.
//!
//! Semantics are driven by the condition name, never by the inferred column
//! type. Each condition belongs to one family:
//!
//! | Family    | Conditions                                                      | Unparseable operand |
//! |-----------|-----------------------------------------------------------------|---------------------|
//! | Numeric   | equals, greaterThan, lessThan, greaterThanOrEqual, lessThanOrEqual, between | false  |
//! | Numeric   | notEquals                                                       | true                |
//! | Text      | contains, doesNotContain, startsWith, endsWith, exactMatch      | n/a                 |
//! | Date      | before, after, on, betweenDates                                 | false               |
//! | Emptiness | isEmpty, isNotEmpty                                             | n/a                 |
//!
//! Text operators are case-insensitive except `exactMatch`, which compares the
//! coerced cell text byte for byte. Unknown condition names match every row.
//! That pass-through is intentional; callers wanting a hard failure check
//! [`ConditionKind::is_known`] before filtering.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::dates;
use crate::record::Row;
use crate::value::{parse_number, CellValue};

/// Condition families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFamily {
    Numeric,
    Text,
    Date,
    Emptiness,
    Unknown,
}

/// A filter condition name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionKind {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Between,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    ExactMatch,
    Before,
    After,
    On,
    BetweenDates,
    IsEmpty,
    IsNotEmpty,
    /// Unrecognised name, kept verbatim so it survives serialization
    Unknown(String),
}

impl ConditionKind {
    /// Parses a wire name. Names are case-sensitive.
    pub fn parse(name: &str) -> Self {
        match name {
            "equals" => ConditionKind::Equals,
            "notEquals" => ConditionKind::NotEquals,
            "greaterThan" => ConditionKind::GreaterThan,
            "lessThan" => ConditionKind::LessThan,
            "greaterThanOrEqual" => ConditionKind::GreaterThanOrEqual,
            "lessThanOrEqual" => ConditionKind::LessThanOrEqual,
            "between" => ConditionKind::Between,
            "contains" => ConditionKind::Contains,
            "doesNotContain" => ConditionKind::DoesNotContain,
            "startsWith" => ConditionKind::StartsWith,
            "endsWith" => ConditionKind::EndsWith,
            "exactMatch" => ConditionKind::ExactMatch,
            "before" => ConditionKind::Before,
            "after" => ConditionKind::After,
            "on" => ConditionKind::On,
            "betweenDates" => ConditionKind::BetweenDates,
            "isEmpty" => ConditionKind::IsEmpty,
            "isNotEmpty" => ConditionKind::IsNotEmpty,
            other => ConditionKind::Unknown(other.to_string()),
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &str {
        match self {
            ConditionKind::Equals => "equals",
            ConditionKind::NotEquals => "notEquals",
            ConditionKind::GreaterThan => "greaterThan",
            ConditionKind::LessThan => "lessThan",
            ConditionKind::GreaterThanOrEqual => "greaterThanOrEqual",
            ConditionKind::LessThanOrEqual => "lessThanOrEqual",
            ConditionKind::Between => "between",
            ConditionKind::Contains => "contains",
            ConditionKind::DoesNotContain => "doesNotContain",
            ConditionKind::StartsWith => "startsWith",
            ConditionKind::EndsWith => "endsWith",
            ConditionKind::ExactMatch => "exactMatch",
            ConditionKind::Before => "before",
            ConditionKind::After => "after",
            ConditionKind::On => "on",
            ConditionKind::BetweenDates => "betweenDates",
            ConditionKind::IsEmpty => "isEmpty",
            ConditionKind::IsNotEmpty => "isNotEmpty",
            ConditionKind::Unknown(name) => name,
        }
    }

    pub fn family(&self) -> ConditionFamily {
        use ConditionKind::*;
        match self {
            Equals | NotEquals | GreaterThan | LessThan | GreaterThanOrEqual
            | LessThanOrEqual | Between => ConditionFamily::Numeric,
            Contains | DoesNotContain | StartsWith | EndsWith | ExactMatch => {
                ConditionFamily::Text
            }
            Before | After | On | BetweenDates => ConditionFamily::Date,
            IsEmpty | IsNotEmpty => ConditionFamily::Emptiness,
            Unknown(_) => ConditionFamily::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ConditionKind::Unknown(_))
    }

    /// Returns true for conditions that read `value2`.
    pub fn is_range(&self) -> bool {
        matches!(self, ConditionKind::Between | ConditionKind::BetweenDates)
    }
}

impl From<String> for ConditionKind {
    fn from(name: String) -> Self {
        match ConditionKind::parse(&name) {
            ConditionKind::Unknown(_) => ConditionKind::Unknown(name),
            known => known,
        }
    }
}

impl From<ConditionKind> for String {
    fn from(kind: ConditionKind) -> Self {
        match kind {
            ConditionKind::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One filter condition as exchanged with callers.
///
/// Operands always travel as text and are interpreted per condition family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    pub column: String,
    pub condition: ConditionKind,
    #[serde(default, deserialize_with = "operand_text")]
    pub value: String,
    #[serde(
        default,
        deserialize_with = "optional_operand_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub value2: Option<String>,
}

impl FilterCondition {
    pub fn new(column: impl Into<String>, condition: &str, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            condition: ConditionKind::parse(condition),
            value: value.into(),
            value2: None,
        }
    }

    /// Sets the upper bound of a range condition.
    pub fn with_value2(mut self, value2: impl Into<String>) -> Self {
        self.value2 = Some(value2.into());
        self
    }
}

/// Accepts any JSON scalar as operand text; clients often send bare numbers.
fn operand_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(json_to_text(JsonValue::deserialize(deserializer)?))
}

fn optional_operand_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => None,
        other => Some(json_to_text(other)),
    })
}

fn json_to_text(value: JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
enum NumericOp {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
}

#[derive(Debug, Clone, Copy)]
enum TextOp {
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
}

#[derive(Debug, Clone, Copy)]
enum DateOp {
    Before,
    After,
    On,
}

#[derive(Debug, Clone)]
enum Test {
    Numeric(NumericOp, Option<f64>),
    NotEquals(Option<f64>),
    Between(Option<f64>, Option<f64>),
    Text(TextOp, String),
    ExactMatch(String),
    Date(DateOp, Option<NaiveDateTime>),
    BetweenDates(Option<NaiveDateTime>, Option<NaiveDateTime>),
    IsEmpty,
    IsNotEmpty,
    PassThrough,
}

/// A condition bound to a header, ready to test rows.
///
/// Compiling resolves the column position and parses the operand text once,
/// so evaluating millions of rows does not re-parse it.
#[derive(Debug, Clone)]
pub struct Predicate {
    column: Option<usize>,
    test: Test,
}

impl Predicate {
    /// Binds `condition` to `headers`.
    ///
    /// A column missing from the header reads as a null cell in every row.
    pub fn compile(headers: &[String], condition: &FilterCondition) -> Self {
        let column = headers.iter().position(|h| h == &condition.column);
        let value = condition.value.as_str();
        let value2 = condition.value2.as_deref().unwrap_or("");

        let test = match &condition.condition {
            ConditionKind::Equals => Test::Numeric(NumericOp::Eq, parse_number(value)),
            ConditionKind::GreaterThan => Test::Numeric(NumericOp::Gt, parse_number(value)),
            ConditionKind::LessThan => Test::Numeric(NumericOp::Lt, parse_number(value)),
            ConditionKind::GreaterThanOrEqual => {
                Test::Numeric(NumericOp::Ge, parse_number(value))
            }
            ConditionKind::LessThanOrEqual => Test::Numeric(NumericOp::Le, parse_number(value)),
            ConditionKind::NotEquals => Test::NotEquals(parse_number(value)),
            ConditionKind::Between => Test::Between(parse_number(value), parse_number(value2)),
            ConditionKind::Contains => Test::Text(TextOp::Contains, value.to_lowercase()),
            ConditionKind::DoesNotContain => {
                Test::Text(TextOp::DoesNotContain, value.to_lowercase())
            }
            ConditionKind::StartsWith => Test::Text(TextOp::StartsWith, value.to_lowercase()),
            ConditionKind::EndsWith => Test::Text(TextOp::EndsWith, value.to_lowercase()),
            ConditionKind::ExactMatch => Test::ExactMatch(value.to_string()),
            ConditionKind::Before => Test::Date(DateOp::Before, dates::parse_date(value)),
            ConditionKind::After => Test::Date(DateOp::After, dates::parse_date(value)),
            ConditionKind::On => Test::Date(DateOp::On, dates::parse_date(value)),
            ConditionKind::BetweenDates => {
                Test::BetweenDates(dates::parse_date(value), dates::parse_date(value2))
            }
            ConditionKind::IsEmpty => Test::IsEmpty,
            ConditionKind::IsNotEmpty => Test::IsNotEmpty,
            ConditionKind::Unknown(_) => Test::PassThrough,
        };

        Self { column, test }
    }

    /// Tests one row of the set this predicate was compiled against.
    pub fn evaluate(&self, row: &Row) -> bool {
        match self.column {
            Some(idx) => self.evaluate_cell(row.get(idx)),
            None => self.evaluate_cell(&CellValue::Null),
        }
    }

    /// Tests a single cell.
    pub fn evaluate_cell(&self, cell: &CellValue) -> bool {
        match &self.test {
            Test::Numeric(op, operand) => match (cell.as_number(), operand) {
                (Some(a), Some(b)) => match op {
                    NumericOp::Eq => a == *b,
                    NumericOp::Gt => a > *b,
                    NumericOp::Lt => a < *b,
                    NumericOp::Ge => a >= *b,
                    NumericOp::Le => a <= *b,
                },
                _ => false,
            },
            Test::NotEquals(operand) => match (cell.as_number(), operand) {
                (Some(a), Some(b)) => a != *b,
                _ => true,
            },
            Test::Between(low, high) => match (cell.as_number(), low, high) {
                (Some(n), Some(low), Some(high)) => n >= *low && n <= *high,
                _ => false,
            },
            Test::Text(op, needle) => {
                let hay = cell.as_text().to_lowercase();
                match op {
                    TextOp::Contains => hay.contains(needle.as_str()),
                    TextOp::DoesNotContain => !hay.contains(needle.as_str()),
                    TextOp::StartsWith => hay.starts_with(needle.as_str()),
                    TextOp::EndsWith => hay.ends_with(needle.as_str()),
                }
            }
            Test::ExactMatch(expected) => cell.as_text() == expected.as_str(),
            Test::Date(op, operand) => match (cell.as_date(), operand) {
                (Some(d), Some(target)) => match op {
                    DateOp::Before => d < *target,
                    DateOp::After => d > *target,
                    DateOp::On => d.date() == target.date(),
                },
                _ => false,
            },
            Test::BetweenDates(start, end) => match (cell.as_date(), start, end) {
                (Some(d), Some(start), Some(end)) => d >= *start && d <= *end,
                _ => false,
            },
            Test::IsEmpty => cell.is_blank(),
            Test::IsNotEmpty => !cell.is_blank(),
            Test::PassThrough => true,
        }
    }
}

/// Evaluates one condition against one row of a set with the given header.
///
/// Filtering many rows should compile a [`Predicate`] once instead.
pub fn evaluate(headers: &[String], row: &Row, condition: &FilterCondition) -> bool {
    Predicate::compile(headers, condition).evaluate(row)
}
