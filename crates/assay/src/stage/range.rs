use indexmap::IndexMap;

use crate::config::RangeRule;
use crate::dataset::Dataset;
use crate::error::{AssayError, Result};
use crate::logging::LogSink;
use crate::report::IssueRecord;

use super::{Stage, StageOutput, skip_missing_column};

/// Removes rows whose numeric value falls outside the configured bounds.
///
/// Nulls and non-numeric cells never violate.
pub struct RangeStage {
    rules: IndexMap<String, RangeRule>,
}

impl RangeStage {
    pub fn new(rules: IndexMap<String, RangeRule>) -> Self {
        Self { rules }
    }
}

impl Stage for RangeStage {
    fn name(&self) -> &str {
        "range_checks"
    }

    fn preflight(&self, _dataset: &Dataset) -> Result<()> {
        for (name, rule) in &self.rules {
            rule.validate().map_err(|e| {
                AssayError::InvalidConfig(format!("range_checks.{}: {}", name, e))
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

            log.debug(&format!(
                "Checking range for '{}': min={:?}, max={:?}",
                name, rule.min, rule.max
            ));
            let violations: Vec<bool> = column
                .values()
                .iter()
                .map(|v| v.as_f64().is_some_and(|x| rule.violates(x)))
                .collect();

            let (remaining, removed) = dataset.drop_rows(&violations);
            dataset = remaining;
            if removed == 0 {
                continue;
            }

            log.warn(&format!(
                "Column '{}': removed {} rows outside [{}, {}]",
                name,
                removed,
                rule.min.map_or("-inf".to_string(), |m| m.to_string()),
                rule.max.map_or("inf".to_string(), |m| m.to_string()),
            ));
            issues.push(IssueRecord::RangeViolation {
                column: name.clone(),
                count: removed,
                min: rule.min,
                max: rule.max,
            });
        }

        Ok(StageOutput::with_issues(dataset, issues))
    }
}
