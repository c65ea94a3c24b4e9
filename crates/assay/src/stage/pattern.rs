use indexmap::IndexMap;

use crate::config::PatternRule;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::logging::LogSink;
use crate::report::IssueRecord;

use super::{Stage, StageOutput, skip_missing_column};

/// Examples of invalid values included in debug logs.
const MAX_LOGGED_EXAMPLES: usize = 3;

/// Removes rows whose value, rendered as text, does not match the column's regex.
pub struct PatternStage {
    rules: IndexMap<String, PatternRule>,
}

impl PatternStage {
    pub fn new(rules: IndexMap<String, PatternRule>) -> Self {
        Self { rules }
    }
}

impl Stage for PatternStage {
    fn name(&self) -> &str {
        "pattern_validation"
    }

    fn apply(&self, mut dataset: Dataset, log: &dyn LogSink) -> Result<StageOutput> {
        let mut issues = Vec::new();

        for (name, rule) in &self.rules {
            let Some(column) = dataset.column(name) else {
                skip_missing_column(log, self.name(), name);
                continue;
            };

            log.debug(&format!("Validating pattern for '{}': {}", name, rule.pattern()));
            let mut examples = Vec::new();
            let invalid: Vec<bool> = column
                .values()
                .iter()
                .map(|v| {
                    if v.is_null() {
                        return false;
                    }
                    let text = v.to_string();
                    let bad = !rule.is_match(&text);
                    if bad && examples.len() < MAX_LOGGED_EXAMPLES {
                        examples.push(text);
                    }
                    bad
                })
                .collect();

            let (remaining, removed) = dataset.drop_rows(&invalid);
            dataset = remaining;
            if removed == 0 {
                log.info(&format!("All values in '{}' match pattern", name));
                continue;
            }

            log.warn(&format!(
                "Column '{}': removed {} rows not matching pattern",
                name, removed
            ));
            log.debug(&format!("Invalid pattern examples: {:?}", examples));
            issues.push(IssueRecord::PatternViolation {
                column: name.clone(),
                count: removed,
                pattern: rule.pattern().to_string(),
            });
        }

        Ok(StageOutput::with_issues(dataset, issues))
    }
}
