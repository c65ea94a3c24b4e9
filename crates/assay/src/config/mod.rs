//! Declarative validation configuration.
//!
//! A [`ValidationConfig`] is a record of optional per-stage option blocks.
//! A block that is absent means the stage does not run. Keys the library does
//! not recognise are retained rather than rejected, so configurations written
//! for newer versions (or for custom stages) still load.
//!
//! ```
//! use assay::config::ValidationConfig;
//!
//! let config = ValidationConfig::from_json_str(r#"{
//!     "check_duplicates": {"subset": ["id"], "keep": "first"},
//!     "null_handling": {"age": {"strategy": "fill_median"}},
//!     "range_checks": {"age": {"min": 0, "max": 120}}
//! }"#).unwrap();
//!
//! assert_eq!(config.enabled_stages(), vec!["check_duplicates", "null_handling", "range_checks"]);
//! ```

mod options;

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AssayError, Result};

pub use options::{
    DuplicateOptions, KeepPolicy, NullStrategy, OutlierMethod, OutlierRule, PatternRule,
    RangeRule, TargetType,
};

/// Built-in stage keys in execution order.
pub const BUILTIN_STAGES: [&str; 7] = [
    "check_duplicates",
    "required_columns",
    "null_handling",
    "type_validation",
    "range_checks",
    "pattern_validation",
    "outlier_detection",
];

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Duplicate-row detection and removal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_duplicates: Option<DuplicateOptions>,

    /// Columns that must be present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_columns: Option<Vec<String>>,

    /// Null remediation strategy per column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_handling: Option<IndexMap<String, NullStrategy>>,

    /// Target type per column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_validation: Option<IndexMap<String, TargetType>>,

    /// Numeric bounds per column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_checks: Option<IndexMap<String, RangeRule>>,

    /// Regex per column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_validation: Option<IndexMap<String, PatternRule>>,

    /// Outlier method per column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlier_detection: Option<IndexMap<String, OutlierRule>>,

    /// Keys not recognised by the built-in stages.
    #[serde(flatten)]
    extra: IndexMap<String, serde_json::Value>,
}

impl ValidationConfig {
    /// An empty configuration (no stage runs).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AssayError::InvalidConfig(e.to_string()))
    }

    /// Parse a configuration from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(AssayError::InvalidConfig(
                "configuration must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| AssayError::InvalidConfig(e.to_string()))
    }

    /// Load a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| AssayError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&contents)
    }

    /// Serialize back to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether the given built-in stage key is present.
    pub fn has_stage(&self, key: &str) -> bool {
        match key {
            "check_duplicates" => self.check_duplicates.is_some(),
            "required_columns" => self.required_columns.is_some(),
            "null_handling" => self.null_handling.is_some(),
            "type_validation" => self.type_validation.is_some(),
            "range_checks" => self.range_checks.is_some(),
            "pattern_validation" => self.pattern_validation.is_some(),
            "outlier_detection" => self.outlier_detection.is_some(),
            _ => false,
        }
    }

    /// Built-in stage keys that are present, in execution order.
    pub fn enabled_stages(&self) -> Vec<&'static str> {
        BUILTIN_STAGES
            .iter()
            .copied()
            .filter(|key| self.has_stage(key))
            .collect()
    }

    /// Top-level keys that no built-in stage recognises.
    pub fn ignored_keys(&self) -> Vec<&str> {
        self.extra.keys().map(String::as_str).collect()
    }

    /// Raw options stored under an unrecognised key (read by custom stages).
    pub fn extension(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }

    /// Store options for a custom stage.
    pub fn with_extension(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub fn with_duplicates(mut self, options: DuplicateOptions) -> Self {
        self.check_duplicates = Some(options);
        self
    }

    pub fn with_required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_null_strategy(mut self, column: impl Into<String>, strategy: NullStrategy) -> Self {
        self.null_handling
            .get_or_insert_with(IndexMap::new)
            .insert(column.into(), strategy);
        self
    }

    pub fn with_type(mut self, column: impl Into<String>, target: TargetType) -> Self {
        self.type_validation
            .get_or_insert_with(IndexMap::new)
            .insert(column.into(), target);
        self
    }

    pub fn with_range(mut self, column: impl Into<String>, rule: RangeRule) -> Self {
        self.range_checks
            .get_or_insert_with(IndexMap::new)
            .insert(column.into(), rule);
        self
    }

    /// Add a pattern rule; fails if the regex does not compile.
    pub fn with_pattern(mut self, column: impl Into<String>, pattern: &str) -> Result<Self> {
        let rule = PatternRule::new(pattern).map_err(|e| {
            AssayError::InvalidConfig(format!("invalid pattern '{}': {}", pattern, e))
        })?;
        self.pattern_validation
            .get_or_insert_with(IndexMap::new)
            .insert(column.into(), rule);
        Ok(self)
    }

    pub fn with_outlier(mut self, column: impl Into<String>, rule: OutlierRule) -> Self {
        self.outlier_detection
            .get_or_insert_with(IndexMap::new)
            .insert(column.into(), rule);
        self
    }
}
