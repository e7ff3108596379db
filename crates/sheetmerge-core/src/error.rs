//! Error types for SheetMerge.

use std::fmt;

use thiserror::Error;

/// Which input a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The primary record set of a join
    Primary,
    /// The reference record set of a join
    Reference,
    /// The single record set of a filter, sort or inference call
    Dataset,
}

impl Side {
    /// Returns the name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Primary => "primary",
            Side::Reference => "reference",
            Side::Dataset => "dataset",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for SheetMerge operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A requested column is not part of the record set header
    #[error("column '{column}' not found in {side} data")]
    MissingColumn {
        /// Which record set was searched
        side: Side,
        /// The column that was requested
        column: String,
    },

    /// A record set that must contain rows is empty
    #[error("{side} data is empty")]
    EmptyDataset {
        /// Which record set was empty
        side: Side,
    },

    /// Any other malformed or missing input
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending request field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// Memory or size limits exceeded while producing a result
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Malformed payload at the JSON boundary
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Creates a [`Error::Validation`] for the given field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a [`Error::MissingColumn`].
    pub fn missing_column(side: Side, column: impl Into<String>) -> Self {
        Error::MissingColumn {
            side,
            column: column.into(),
        }
    }

    /// Returns true for every member of the validation family.
    ///
    /// Validation errors are always recoverable and carry no partial result.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingColumn { .. }
                | Error::EmptyDataset { .. }
                | Error::Validation { .. }
                | Error::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Error::ResourceExhausted(format!(
            "{err}; paginate, filter the data first, or export a smaller selection"
        ))
    }
}

/// A specialized `Result` type for SheetMerge operations.
pub type Result<T> = std::result::Result<T, Error>;
