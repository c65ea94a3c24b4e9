use indexmap::IndexMap;

use crate::config::TargetType;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::logging::LogSink;
use crate::report::IssueRecord;

use super::{Stage, StageOutput, skip_missing_column};

/// Casts columns to their target type, nulling values that do not convert.
pub struct TypeValidationStage {
    targets: IndexMap<String, TargetType>,
}

impl TypeValidationStage {
    pub fn new(targets: IndexMap<String, TargetType>) -> Self {
        Self { targets }
    }
}

impl Stage for TypeValidationStage {
    fn name(&self) -> &str {
        "type_validation"
    }

    fn apply(&self, mut dataset: Dataset, log: &dyn LogSink) -> Result<StageOutput> {
        let mut issues = Vec::new();

        for (name, target) in &self.targets {
            let Some(column) = dataset.column_mut(name) else {
                skip_missing_column(log, self.name(), name);
                continue;
            };

            log.debug(&format!("Converting '{}' to type '{}'", name, target));
            let failures = column.cast(target.column_type());

            if failures == 0 {
                log.info(&format!("Converted '{}' to {}", name, target));
                continue;
            }

            log.warn(&format!(
                "Column '{}': {} values could not be converted to {} and were set to null",
                name, failures, target
            ));
            issues.push(IssueRecord::TypeConversionFailure {
                column: name.clone(),
                count: failures,
                target_type: *target,
            });
        }

        Ok(StageOutput::with_issues(dataset, issues))
    }
}
