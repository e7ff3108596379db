//! Operation results.
//!
//! Every response serializes to the camelCase JSON shape returned by
//! [`Engine::handle_json`](crate::Engine::handle_json). Record sets serialize
//! as arrays of row objects in header order.

use serde::Serialize;

use sheetmerge_core::{ColumnTypeMap, RecordSet};

/// Result of `inferTypes`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferTypesResponse {
    pub column_types: ColumnTypeMap,
}

/// Result of `filter`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse {
    pub data: RecordSet,
    pub headers: Vec<String>,
    pub total_rows: usize,
    pub original_rows: usize,
}

/// Result of `referenceJoin`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceJoinResponse {
    pub data: RecordSet,
    pub headers: Vec<String>,
    pub total_rows: usize,
    pub original_primary_rows: usize,
    /// Reference rows left after filtering
    pub filtered_ref_rows: usize,
    /// Distinct composite keys that matched
    pub matched_rows: usize,
    pub unmatched_primary_rows: usize,
}

/// Result of `sortAndPage`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortAndPageResponse {
    /// Rows of the requested page
    pub data: RecordSet,
    pub headers: Vec<String>,
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub has_more: bool,
}

/// Any operation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    InferTypes(InferTypesResponse),
    Filter(FilterResponse),
    ReferenceJoin(ReferenceJoinResponse),
    SortAndPage(SortAndPageResponse),
}
