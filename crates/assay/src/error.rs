//! Error types for the Assay library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Assay operations.
#[derive(Debug, Error)]
pub enum AssayError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no header to build a dataset from.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Columns of a dataset do not share the same length.
    #[error("Column '{column}' has {found} values, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Invalid configuration (unsupported strategy, method, type or pattern).
    ///
    /// This is a caller bug and is never recovered by the pipeline.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A stage references columns that do not exist in the dataset.
    ///
    /// The pipeline skips the stage and records a warning.
    #[error("Stage '{stage}' references missing columns: {}", columns.join(", "))]
    MissingColumns { stage: String, columns: Vec<String> },

    /// Failure to save or load a report.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssayError {
    /// Whether the pipeline can skip the failing stage and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AssayError::MissingColumns { .. })
    }
}

/// Result type alias for Assay operations.
pub type Result<T> = std::result::Result<T, AssayError>;
