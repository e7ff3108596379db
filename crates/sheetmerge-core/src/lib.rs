//! # SheetMerge Core
//!
//! Typed predicate evaluation and composite-key join engine for
//! spreadsheet-derived record sets.
//!
//! Everything here is a pure, synchronous function of its inputs: no logging,
//! no I/O, no shared state. Callers own presentation of errors.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! Users should depend on the main `sheetmerge` crate instead, which provides
//! the stable public API.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Date parsing
pub mod dates;
pub mod error;
/// Composite filtering
#[allow(missing_docs)]
pub mod filter;
/// Type inference
#[allow(missing_docs)]
pub mod inference;
/// Composite-key join
#[allow(missing_docs)]
pub mod join;
/// Pagination
#[allow(missing_docs)]
pub mod page;
/// Predicate evaluation
#[allow(missing_docs)]
pub mod predicate;
/// Records and record sets
#[allow(missing_docs)]
pub mod record;
/// Row sorting
#[allow(missing_docs)]
pub mod sort;
pub mod value;

pub use error::{Error, Result, Side};
pub use filter::{filter, filter_owned, Combinator, LogicOperator};
pub use inference::{classify, infer_types, ColumnType, ColumnTypeMap, InferenceConfig};
pub use join::{
    check_join_columns, join, join_with_limits, JoinIndex, JoinLimits, JoinOutcome, JoinType,
    KeyColumnPair, REF_PREFIX,
};
pub use page::{paginate, Page};
pub use predicate::{evaluate, ConditionFamily, ConditionKind, FilterCondition, Predicate};
pub use record::{RecordSet, Row};
pub use sort::{sort, SortDirection, SortKey};
pub use value::CellValue;

#[cfg(test)]
mod property_tests;
