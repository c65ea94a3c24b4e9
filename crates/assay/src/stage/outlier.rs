//! Statistical outlier removal (IQR fences or z-score cutoff).

use indexmap::IndexMap;

use crate::config::{OutlierMethod, OutlierRule};
use crate::dataset::{Column, Dataset};
use crate::error::{AssayError, Result};
use crate::logging::LogSink;
use crate::report::{IssueRecord, percentage};

use super::{Stage, StageOutput, skip_missing_column};

pub struct OutlierStage {
    rules: IndexMap<String, OutlierRule>,
}

impl OutlierStage {
    pub fn new(rules: IndexMap<String, OutlierRule>) -> Self {
        Self { rules }
    }
}

/// Rows flagged in one column plus the bounds used.
struct Detection {
    mask: Vec<bool>,
    lower: f64,
    upper: f64,
}

impl Stage for OutlierStage {
    fn name(&self) -> &str {
        "outlier_detection"
    }

    fn preflight(&self, _dataset: &Dataset) -> Result<()> {
        for (name, rule) in &self.rules {
            rule.validate().map_err(|e| {
                AssayError::InvalidConfig(format!("outlier_detection.{}: {}", name, e))
            })?;
        }
        Ok(())
    }

    fn apply(&self, mut dataset: Dataset, log: &dyn LogSink) -> Result<StageOutput> {
        let mut issues = Vec::new();

        for (name, rule) in &self.rules {
            let Some(column) = dataset.column(name) else {
                skip_missing_column(log, self.name(), name);
                continue;
            };
            if !column.is_numeric() {
                log.warn(&format!(
                    "Column '{}' is {}, not numeric; skipping outlier detection",
                    name,
                    column.dtype()
                ));
                continue;
            }

            let threshold = rule.effective_threshold();
            log.debug(&format!(
                "Detecting outliers in '{}' using {} (threshold {})",
                name, rule.method, threshold
            ));
            let Some(detection) = detect(column, rule.method, threshold) else {
                continue;
            };
            log.debug(&format!(
                "Bounds for '{}': [{:.2}, {:.2}]",
                name, detection.lower, detection.upper
            ));

            let rows = dataset.row_count();
            let (remaining, removed) = dataset.drop_rows(&detection.mask);
            dataset = remaining;
            if removed == 0 {
                continue;
            }

            let pct = percentage(removed, rows);
            log.warn(&format!(
                "Column '{}': removed {} outliers ({:.2}%)",
                name, removed, pct
            ));
            issues.push(IssueRecord::Outlier {
                column: name.clone(),
                count: removed,
                percentage: pct,
                method: rule.method,
                threshold,
                lower_bound: detection.lower,
                upper_bound: detection.upper,
            });
        }

        Ok(StageOutput::with_issues(dataset, issues))
    }
}

/// Flag outliers in a numeric column; `None` when it has no non-null values.
fn detect(column: &Column, method: OutlierMethod, threshold: f64) -> Option<Detection> {
    let summary = column.numeric_summary()?;

    let (lower, upper) = match method {
        OutlierMethod::Iqr => summary.iqr_bounds(threshold),
        OutlierMethod::ZScore => (
            summary.mean - threshold * summary.std,
            summary.mean + threshold * summary.std,
        ),
    };

    let mask = column
        .values()
        .iter()
        .map(|v| {
            let Some(x) = v.as_f64() else {
                return false;
            };
            match method {
                OutlierMethod::Iqr => x < lower || x > upper,
                // Zero spread yields no z-score, so nothing is flagged.
                OutlierMethod::ZScore => summary.z_score(x).is_some_and(|z| z.abs() > threshold),
            }
        })
        .collect();

    Some(Detection { mask, lower, upper })
}
