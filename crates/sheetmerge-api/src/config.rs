//! Engine configuration.

use serde::Deserialize;

use sheetmerge_core::{InferenceConfig, JoinLimits, Result};

/// Engine configuration options
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Sampling used by type inference
    pub inference: InferenceConfig,
    /// Page size when a request does not name one
    pub default_page_size: usize,
    /// Largest page size a request may ask for; larger requests are capped
    pub max_page_size: usize,
    /// Abort joins that would emit more rows than this
    pub max_join_rows: Option<usize>,
    /// Reject unknown condition names instead of matching every row
    pub strict_conditions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            default_page_size: 50,
            max_page_size: 10_000,
            max_join_rows: None,
            strict_conditions: false,
        }
    }
}

impl EngineConfig {
    /// Loads a configuration from a JSON document. Missing fields keep their
    /// defaults.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sheetmerge::EngineConfig;
    ///
    /// let config = EngineConfig::from_json(r#"{"defaultPageSize": 25}"#)?;
    /// assert_eq!(config.default_page_size, 25);
    /// assert!(!config.strict_conditions);
    /// # Ok::<(), sheetmerge::Error>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the default page size
    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Set the maximum page size
    pub fn with_max_page_size(mut self, page_size: usize) -> Self {
        self.max_page_size = page_size;
        self
    }

    /// Cap join output
    pub fn with_max_join_rows(mut self, rows: usize) -> Self {
        self.max_join_rows = Some(rows);
        self
    }

    /// Reject unknown condition names
    pub fn strict(mut self) -> Self {
        self.strict_conditions = true;
        self
    }

    /// Set inference sampling
    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    pub(crate) fn join_limits(&self) -> JoinLimits {
        JoinLimits {
            max_rows: self.max_join_rows,
        }
    }

    /// Resolves the page size of a request.
    pub(crate) fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}
