//! JSON request payloads.
//!
//! Record sets arrive as arrays of row objects. Payload structs keep the raw
//! `data` values so that a malformed field can be reported by name instead of
//! as a generic deserialization failure.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use sheetmerge_core::{
    Error, FilterCondition, JoinType, KeyColumnPair, LogicOperator, RecordSet, Result,
    SortDirection,
};

/// `inferTypes` payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferTypesRequest {
    #[serde(default)]
    pub data: JsonValue,
    #[serde(default)]
    pub headers: Option<Vec<String>>,
}

/// `filter` payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[serde(default)]
    pub data: JsonValue,
    #[serde(default)]
    pub headers: Option<Vec<String>>,
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
    #[serde(default)]
    pub logic_operator: LogicOperator,
}

/// `referenceJoin` payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceJoinRequest {
    #[serde(default)]
    pub reference_data: JsonValue,
    #[serde(default)]
    pub reference_headers: Option<Vec<String>>,
    #[serde(default)]
    pub primary_data: JsonValue,
    #[serde(default)]
    pub primary_headers: Option<Vec<String>>,
    #[serde(default)]
    pub key_columns: Vec<KeyColumnPair>,
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
    #[serde(default)]
    pub logic_operator: LogicOperator,
    #[serde(default)]
    pub join_type: JoinType,
}

/// `sortAndPage` payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortAndPageRequest {
    #[serde(default)]
    pub data: JsonValue,
    #[serde(default)]
    pub headers: Option<Vec<String>>,
    #[serde(default)]
    pub sort_column: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Envelope accepted by [`Engine::handle_json`](crate::Engine::handle_json).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum Request {
    InferTypes(InferTypesRequest),
    Filter(FilterRequest),
    ReferenceJoin(ReferenceJoinRequest),
    SortAndPage(SortAndPageRequest),
}

impl Request {
    /// Wire name of the operation.
    pub fn operation(&self) -> &'static str {
        match self {
            Request::InferTypes(_) => "inferTypes",
            Request::Filter(_) => "filter",
            Request::ReferenceJoin(_) => "referenceJoin",
            Request::SortAndPage(_) => "sortAndPage",
        }
    }
}

impl InferTypesRequest {
    pub fn record_set(&mut self) -> Result<RecordSet> {
        decode_record_set("data", self.data.take(), self.headers.take())
    }
}

impl FilterRequest {
    pub fn record_set(&mut self) -> Result<RecordSet> {
        decode_record_set("data", self.data.take(), self.headers.take())
    }
}

impl ReferenceJoinRequest {
    /// Decodes `(reference, primary)`.
    pub fn record_sets(&mut self) -> Result<(RecordSet, RecordSet)> {
        let reference = decode_record_set(
            "referenceData",
            self.reference_data.take(),
            self.reference_headers.take(),
        )?;
        let primary = decode_record_set(
            "primaryData",
            self.primary_data.take(),
            self.primary_headers.take(),
        )?;
        Ok((reference, primary))
    }
}

impl SortAndPageRequest {
    pub fn record_set(&mut self) -> Result<RecordSet> {
        decode_record_set("data", self.data.take(), self.headers.take())
    }
}

/// Decodes an array of row objects into a record set.
///
/// `field` names the request field in validation errors.
pub fn decode_record_set(
    field: &str,
    data: JsonValue,
    headers: Option<Vec<String>>,
) -> Result<RecordSet> {
    let items = match data {
        JsonValue::Array(items) => items,
        JsonValue::Null => {
            return Err(Error::validation(field, "an array of row objects is required"))
        }
        other => {
            return Err(Error::validation(
                field,
                format!("expected an array of row objects, got {}", json_kind(&other)),
            ))
        }
    };

    let mut objects = Vec::new();
    objects.try_reserve(items.len())?;
    for (position, item) in items.into_iter().enumerate() {
        match item {
            JsonValue::Object(object) => objects.push(object),
            other => {
                return Err(Error::validation(
                    field,
                    format!("row {position} is {}, expected an object", json_kind(&other)),
                ))
            }
        }
    }

    RecordSet::from_json_rows(headers, objects)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
