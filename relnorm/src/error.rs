//! Error types for relnorm.
//!
//! Only malformed input is fatal to an analysis. Budget exhaustion, surrogate
//! keys and frozen decomposition branches are reported as
//! [`Diagnostic`](crate::model::Diagnostic) values on the result instead.

use thiserror::Error;

/// The main error type for the relnorm library.
#[derive(Error, Debug)]
pub enum RelnormError {
    /// The input table cannot be analyzed (no columns, no rows, ragged rows...).
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What is wrong with the input
        reason: String,
    },

    /// DataFusion failed while reading or planning a source query.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Arrow failed to build or render a batch.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A source could not produce a table.
    #[error("{source_type} source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "RecordBatch")
        source_type: String,
        /// What went wrong
        message: String,
        /// Underlying cause, when there is one
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration value is out of range or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A type alias for `Result<T, RelnormError>`.
pub type Result<T> = std::result::Result<T, RelnormError>;

impl RelnormError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// A source error without an underlying cause.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// A source error wrapping `source`.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns true when the error was caused by the caller's input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

impl From<serde_json::Error> for RelnormError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
