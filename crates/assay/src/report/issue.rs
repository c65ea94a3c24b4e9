//! Issue records emitted by pipeline stages.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{OutlierMethod, TargetType};

/// One detected data quality issue.
///
/// Records are immutable once created and serialize with a `type` tag, e.g.
/// `{"type": "null_values", "column": "age", "count": 1, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueRecord {
    /// Duplicate rows removed.
    Duplicates {
        count: usize,
        columns_checked: Vec<String>,
    },

    /// Required columns absent from the dataset.
    MissingColumns { columns: Vec<String>, count: usize },

    /// Nulls found (and remediated) in a column.
    NullValues {
        column: String,
        count: usize,
        percentage: f64,
        strategy: String,
    },

    /// Non-null values that could not be cast and were nulled.
    TypeConversionFailure {
        column: String,
        count: usize,
        target_type: TargetType,
    },

    /// Rows removed for falling outside numeric bounds.
    RangeViolation {
        column: String,
        count: usize,
        min: Option<f64>,
        max: Option<f64>,
    },

    /// Rows removed for not matching a pattern.
    PatternViolation {
        column: String,
        count: usize,
        pattern: String,
    },

    /// Rows removed as statistical outliers.
    Outlier {
        column: String,
        count: usize,
        percentage: f64,
        method: OutlierMethod,
        threshold: f64,
        lower_bound: f64,
        upper_bound: f64,
    },

    /// Issue reported by a registered custom stage.
    Custom {
        stage: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column: Option<String>,
        count: usize,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        details: IndexMap<String, serde_json::Value>,
    },
}

impl IssueRecord {
    /// The `type` tag of this record.
    pub fn kind(&self) -> &'static str {
        match self {
            IssueRecord::Duplicates { .. } => "duplicates",
            IssueRecord::MissingColumns { .. } => "missing_columns",
            IssueRecord::NullValues { .. } => "null_values",
            IssueRecord::TypeConversionFailure { .. } => "type_conversion_failure",
            IssueRecord::RangeViolation { .. } => "range_violation",
            IssueRecord::PatternViolation { .. } => "pattern_violation",
            IssueRecord::Outlier { .. } => "outlier",
            IssueRecord::Custom { .. } => "custom",
        }
    }

    /// Column the issue concerns, if it concerns a single column.
    pub fn column(&self) -> Option<&str> {
        match self {
            IssueRecord::NullValues { column, .. }
            | IssueRecord::TypeConversionFailure { column, .. }
            | IssueRecord::RangeViolation { column, .. }
            | IssueRecord::PatternViolation { column, .. }
            | IssueRecord::Outlier { column, .. } => Some(column),
            IssueRecord::Custom { column, .. } => column.as_deref(),
            IssueRecord::Duplicates { .. } | IssueRecord::MissingColumns { .. } => None,
        }
    }

    /// Number of rows, values or columns affected.
    pub fn count(&self) -> usize {
        match self {
            IssueRecord::Duplicates { count, .. }
            | IssueRecord::MissingColumns { count, .. }
            | IssueRecord::NullValues { count, .. }
            | IssueRecord::TypeConversionFailure { count, .. }
            | IssueRecord::RangeViolation { count, .. }
            | IssueRecord::PatternViolation { count, .. }
            | IssueRecord::Outlier { count, .. }
            | IssueRecord::Custom { count, .. } => *count,
        }
    }

    /// Whether this record's stage removed rows.
    pub fn removes_rows(&self) -> bool {
        matches!(
            self,
            IssueRecord::Duplicates { .. }
                | IssueRecord::RangeViolation { .. }
                | IssueRecord::PatternViolation { .. }
                | IssueRecord::Outlier { .. }
        )
    }
}

/// `count / total * 100`, rounded to two decimals (0 when `total` is 0).
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_values_wire_shape() {
        let issue = IssueRecord::NullValues {
            column: "age".to_string(),
            count: 1,
            percentage: percentage(1, 3),
            strategy: "fill_median".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({
                "type": "null_values",
                "column": "age",
                "count": 1,
                "percentage": 33.33,
                "strategy": "fill_median"
            })
        );
    }

    #[test]
    fn test_range_violation_keeps_open_bounds() {
        let issue = IssueRecord::RangeViolation {
            column: "age".to_string(),
            count: 2,
            min: Some(0.0),
            max: None,
        };
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "range_violation");
        assert_eq!(value["min"], json!(0.0));
        assert!(value["max"].is_null());
    }

    #[test]
    fn test_accessors() {
        let issue = IssueRecord::Outlier {
            column: "salary".to_string(),
            count: 1,
            percentage: 20.0,
            method: OutlierMethod::Iqr,
            threshold: 1.5,
            lower_bound: 47000.0,
            upper_bound: 55000.0,
        };
        assert_eq!(issue.kind(), "outlier");
        assert_eq!(issue.column(), Some("salary"));
        assert_eq!(issue.count(), 1);
        assert!(issue.removes_rows());

        let missing = IssueRecord::MissingColumns {
            columns: vec!["email".to_string()],
            count: 1,
        };
        assert_eq!(missing.column(), None);
        assert!(!missing.removes_rows());
    }

    #[test]
    fn test_deserialize_tagged() {
        let issue: IssueRecord = serde_json::from_value(json!({
            "type": "type_conversion_failure",
            "column": "signup",
            "count": 2,
            "target_type": "datetime"
        }))
        .unwrap();
        assert_eq!(
            issue,
            IssueRecord::TypeConversionFailure {
                column: "signup".to_string(),
                count: 2,
                target_type: TargetType::DateTime,
            }
        );
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(0, 0), 0.0);
    }
}
