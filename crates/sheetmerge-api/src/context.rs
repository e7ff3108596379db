//! Per-request operation context.
//!
//! Carries the request id and row counters for one operation. A fresh context
//! is created for each request and passed explicitly to every engine call;
//! nothing here is shared between requests.

use std::time::{Duration, Instant};

use uuid::Uuid;

/// State of a single request.
#[derive(Debug, Clone)]
pub struct OperationContext {
    request_id: String,
    started: Instant,
    rows_in: usize,
    rows_out: usize,
}

impl OperationContext {
    /// Creates a context with a random request id.
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4().to_string())
    }

    /// Creates a context with an id assigned by the calling layer.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            started: Instant::now(),
            rows_in: 0,
            rows_out: 0,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Time since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Records input and output row counts of the last engine step.
    pub(crate) fn record_rows(&mut self, rows_in: usize, rows_out: usize) {
        self.rows_in += rows_in;
        self.rows_out = rows_out;
    }

    /// Rows consumed so far.
    pub fn rows_in(&self) -> usize {
        self.rows_in
    }

    /// Rows produced by the last step.
    pub fn rows_out(&self) -> usize {
        self.rows_out
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}
