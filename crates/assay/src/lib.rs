//! Assay: configuration-driven data quality pipeline for tabular datasets.
//!
//! Given a dataset and a declarative rule set, Assay detects and remediates
//! common defects (duplicate rows, missing values, wrong types, out-of-range
//! values, malformed strings, statistical outliers) and returns the cleaned
//! dataset together with a structured audit report.
//!
//! # Stages
//!
//! Stages run in a fixed order and only when their configuration key is present:
//!
//! 1. `check_duplicates` - remove duplicate rows
//! 2. `required_columns` - report missing columns
//! 3. `null_handling` - drop or fill nulls per column
//! 4. `type_validation` - cast columns, nulling values that do not convert
//! 5. `range_checks` - remove rows outside numeric bounds
//! 6. `pattern_validation` - remove rows not matching a regex
//! 7. `outlier_detection` - remove IQR / z-score outliers
//!
//! # Example
//!
//! ```no_run
//! use assay::{Pipeline, ValidationConfig};
//!
//! let config = ValidationConfig::from_json_file("rules.json").unwrap();
//! let run = Pipeline::new().validate_file("users.csv", &config).unwrap();
//!
//! println!("Rows: {} -> {}", run.report.rows_processed, run.report.rows_cleaned);
//! for issue in &run.report.issues_found {
//!     println!("{}: {}", issue.kind(), issue.count());
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod input;
pub mod logging;
pub mod report;
pub mod stage;

mod pipeline;

pub use crate::pipeline::{FileValidation, Pipeline};
pub use config::ValidationConfig;
pub use dataset::{Column, ColumnType, Dataset, Value};
pub use error::{AssayError, Result};
pub use input::{Parser, ParserConfig, SourceMetadata};
pub use logging::{LogSink, MemorySink, NoopSink, TracingSink};
pub use report::{IssueRecord, QualityReport, StageWarning};
pub use stage::{Stage, StageOutput, StageRegistry};
