//! # SheetMerge
//!
//! Typed filtering and composite-key joins over spreadsheet-derived record
//! sets.
//!
//! ## Quick Start
//!
//! ```rust
//! use sheetmerge::{Engine, FilterCondition, LogicOperator, OperationContext, RecordSet, Row};
//!
//! let orders = RecordSet::new(
//!     vec!["amt".into(), "note".into()],
//!     vec![Row::from_iter(["150", ""]), Row::from_iter(["abc", "late"])],
//! )?;
//!
//! let engine = Engine::new();
//! let mut ctx = OperationContext::new();
//! let response = engine.filter(
//!     &mut ctx,
//!     &orders,
//!     &[FilterCondition::new("amt", "greaterThan", "100")],
//!     LogicOperator::And,
//! )?;
//! assert_eq!(response.total_rows, 1);
//! assert_eq!(response.original_rows, 2);
//! # Ok::<(), sheetmerge::Error>(())
//! ```
//!
//! ## JSON boundary
//!
//! Service layers can hand whole request envelopes to
//! [`Engine::handle_json`]:
//!
//! ```rust
//! use serde_json::json;
//! use sheetmerge::{Engine, OperationContext};
//!
//! let response = Engine::new().handle_json(
//!     &mut OperationContext::new(),
//!     json!({
//!         "operation": "sortAndPage",
//!         "data": [{"n": "10"}, {"n": "9"}, {"n": "x"}],
//!         "sortColumn": "n",
//!         "pageSize": 2
//!     }),
//! )?;
//! assert_eq!(response["data"], json!([{"n": "9"}, {"n": "10"}]));
//! assert_eq!(response["totalPages"], 2);
//! # Ok::<(), sheetmerge::Error>(())
//! ```

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, info, info_span, warn};

// Re-export core types
pub use sheetmerge_core::{
    classify, CellValue, ColumnType, ColumnTypeMap, ConditionKind, Error, FilterCondition,
    InferenceConfig, JoinType, KeyColumnPair, LogicOperator, RecordSet, Result, Row, Side,
    SortDirection, REF_PREFIX,
};

pub mod config;
pub mod context;
pub mod logging;
pub mod request;
pub mod response;

pub use config::EngineConfig;
pub use context::OperationContext;
pub use request::{
    FilterRequest, InferTypesRequest, ReferenceJoinRequest, Request, SortAndPageRequest,
};
pub use response::{
    FilterResponse, InferTypesResponse, ReferenceJoinResponse, Response, SortAndPageResponse,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point for all operations.
///
/// Cheap to clone; clones share one configuration. The engine holds no
/// per-request state, so a single instance can serve concurrent requests from
/// many threads, each with its own [`OperationContext`].
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Arc<EngineConfig>,
}

impl Engine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Infers a type for every column of `set`.
    pub fn infer_types(
        &self,
        ctx: &mut OperationContext,
        set: &RecordSet,
    ) -> Result<InferTypesResponse> {
        let span =
            info_span!("operation", operation = "inferTypes", request_id = %ctx.request_id());
        let _enter = span.enter();

        let column_types = sheetmerge_core::infer_types(set, &self.config.inference);
        ctx.record_rows(set.len(), set.len());
        info!(
            rows = set.len(),
            columns = column_types.len(),
            elapsed_ms = ctx.elapsed_ms(),
            "inferred column types"
        );
        Ok(InferTypesResponse { column_types })
    }

    /// Keeps the rows of `set` that satisfy `conditions`.
    pub fn filter(
        &self,
        ctx: &mut OperationContext,
        set: &RecordSet,
        conditions: &[FilterCondition],
        operator: LogicOperator,
    ) -> Result<FilterResponse> {
        let span = info_span!("operation", operation = "filter", request_id = %ctx.request_id());
        let _enter = span.enter();

        let result = self
            .check_conditions(conditions)
            .and_then(|()| sheetmerge_core::filter(set, conditions, operator));
        let data = log_failure(result)?;

        ctx.record_rows(set.len(), data.len());
        info!(
            original_rows = set.len(),
            total_rows = data.len(),
            conditions = conditions.len(),
            operator = %operator,
            elapsed_ms = ctx.elapsed_ms(),
            "filter complete"
        );
        Ok(FilterResponse {
            headers: data.headers().to_vec(),
            total_rows: data.len(),
            original_rows: set.len(),
            data,
        })
    }

    /// Filters `reference` and joins `primary` against the surviving rows.
    ///
    /// Both uploaded sets must be non-empty. A reference set that the filters
    /// reduce to nothing is rejected rather than producing an empty or
    /// all-null join.
    #[allow(clippy::too_many_arguments)]
    pub fn reference_join(
        &self,
        ctx: &mut OperationContext,
        reference: &RecordSet,
        primary: &RecordSet,
        key_pairs: &[KeyColumnPair],
        conditions: &[FilterCondition],
        operator: LogicOperator,
        join_type: JoinType,
    ) -> Result<ReferenceJoinResponse> {
        let span =
            info_span!("operation", operation = "referenceJoin", request_id = %ctx.request_id());
        let _enter = span.enter();

        log_failure(self.run_reference_join(
            ctx, reference, primary, key_pairs, conditions, operator, join_type,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn run_reference_join(
        &self,
        ctx: &mut OperationContext,
        reference: &RecordSet,
        primary: &RecordSet,
        key_pairs: &[KeyColumnPair],
        conditions: &[FilterCondition],
        operator: LogicOperator,
        join_type: JoinType,
    ) -> Result<ReferenceJoinResponse> {
        if primary.is_empty() {
            return Err(Error::EmptyDataset {
                side: Side::Primary,
            });
        }
        if reference.is_empty() {
            return Err(Error::EmptyDataset {
                side: Side::Reference,
            });
        }
        // Key columns and the output header depend only on the uploaded
        // headers; check them before the filter can empty the reference set.
        sheetmerge_core::check_join_columns(primary, reference, key_pairs)?;
        self.check_conditions(conditions)?;

        let filtered = sheetmerge_core::filter(reference, conditions, operator)?;
        ctx.record_rows(reference.len(), filtered.len());
        debug!(
            reference_rows = reference.len(),
            filtered_ref_rows = filtered.len(),
            "reference filtered"
        );
        if filtered.is_empty() {
            return Err(Error::validation(
                "filters",
                "no reference rows match the filters; the filtered reference data is empty",
            ));
        }

        let outcome = sheetmerge_core::join_with_limits(
            primary,
            &filtered,
            key_pairs,
            join_type,
            self.config.join_limits(),
        )?;
        let data = outcome.result;

        ctx.record_rows(primary.len(), data.len());
        info!(
            primary_rows = primary.len(),
            filtered_ref_rows = filtered.len(),
            total_rows = data.len(),
            matched_keys = outcome.matched_keys,
            unmatched_primary_rows = outcome.unmatched_primary_rows,
            join_type = %join_type,
            elapsed_ms = ctx.elapsed_ms(),
            "reference join complete"
        );
        Ok(ReferenceJoinResponse {
            headers: data.headers().to_vec(),
            total_rows: data.len(),
            original_primary_rows: primary.len(),
            filtered_ref_rows: filtered.len(),
            matched_rows: outcome.matched_keys,
            unmatched_primary_rows: outcome.unmatched_primary_rows,
            data,
        })
    }

    /// Sorts `set` by `column` and returns one page of the result.
    ///
    /// `page` defaults to 1 and `page_size` to the configured default; page
    /// sizes above the configured maximum are capped.
    pub fn sort_and_page(
        &self,
        ctx: &mut OperationContext,
        set: &RecordSet,
        column: Option<&str>,
        direction: SortDirection,
        page: Option<usize>,
        page_size: Option<usize>,
    ) -> Result<SortAndPageResponse> {
        let span =
            info_span!("operation", operation = "sortAndPage", request_id = %ctx.request_id());
        let _enter = span.enter();

        let page_number = page.unwrap_or(1);
        let page_size = self.config.page_size(page_size);
        let result = sheetmerge_core::sort(set, column, direction).and_then(|sorted| {
            let page = sheetmerge_core::paginate(sorted.rows(), page_number, page_size)?;
            Ok((sorted, page))
        });
        let (sorted, page) = log_failure(result)?;

        let data = RecordSet::new(sorted.headers().to_vec(), page.items)?;
        ctx.record_rows(set.len(), data.len());
        info!(
            total_rows = page.total_items,
            page = page.current_page,
            page_size = page.page_size,
            returned_rows = data.len(),
            sort_column = column.unwrap_or(""),
            elapsed_ms = ctx.elapsed_ms(),
            "sort and page complete"
        );
        Ok(SortAndPageResponse {
            headers: data.headers().to_vec(),
            data,
            current_page: page.current_page,
            page_size: page.page_size,
            total_pages: page.total_pages,
            total_rows: page.total_items,
            has_more: page.has_more,
        })
    }

    /// Runs a typed request envelope.
    pub fn handle(&self, ctx: &mut OperationContext, request: Request) -> Result<Response> {
        match request {
            Request::InferTypes(mut req) => {
                let set = log_rejection(req.record_set())?;
                self.infer_types(ctx, &set).map(Response::InferTypes)
            }
            Request::Filter(mut req) => {
                let set = log_rejection(req.record_set())?;
                self.filter(ctx, &set, &req.filters, req.logic_operator)
                    .map(Response::Filter)
            }
            Request::ReferenceJoin(mut req) => {
                let (reference, primary) = log_rejection(req.record_sets())?;
                self.reference_join(
                    ctx,
                    &reference,
                    &primary,
                    &req.key_columns,
                    &req.filters,
                    req.logic_operator,
                    req.join_type,
                )
                .map(Response::ReferenceJoin)
            }
            Request::SortAndPage(mut req) => {
                let set = log_rejection(req.record_set())?;
                self.sort_and_page(
                    ctx,
                    &set,
                    req.sort_column.as_deref(),
                    req.sort_direction,
                    req.page,
                    req.page_size,
                )
                .map(Response::SortAndPage)
            }
        }
    }

    /// Decodes a JSON envelope `{"operation": ..., ...}`, runs it, and returns
    /// the JSON response.
    ///
    /// Malformed input of any shape is reported as an error; this never panics.
    pub fn handle_json(&self, ctx: &mut OperationContext, payload: JsonValue) -> Result<JsonValue> {
        let request: Request =
            log_rejection(serde_json::from_value(payload).map_err(Error::from))?;
        let response = self.handle(ctx, request)?;
        Ok(serde_json::to_value(response)?)
    }

    /// [`handle_json`](Self::handle_json) for a raw JSON string.
    pub fn handle_json_str(&self, ctx: &mut OperationContext, payload: &str) -> Result<JsonValue> {
        let payload: JsonValue =
            log_rejection(serde_json::from_str(payload).map_err(Error::from))?;
        self.handle_json(ctx, payload)
    }

    fn check_conditions(&self, conditions: &[FilterCondition]) -> Result<()> {
        for condition in conditions.iter().filter(|c| !c.condition.is_known()) {
            if self.config.strict_conditions {
                return Err(Error::validation(
                    "filters",
                    format!(
                        "unknown condition '{}' on column '{}'",
                        condition.condition, condition.column
                    ),
                ));
            }
            warn!(
                condition = %condition.condition,
                column = %condition.column,
                "unknown condition matches every row"
            );
        }
        Ok(())
    }
}

fn log_rejection<T>(result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        debug!(error = %err, "request rejected");
    }
    result
}

fn log_failure<T>(result: Result<T>) -> Result<T> {
    match &result {
        Err(err) if err.is_validation() => debug!(error = %err, "validation failed"),
        Err(err) => warn!(error = %err, "operation aborted"),
        Ok(_) => {}
    }
    result
}
