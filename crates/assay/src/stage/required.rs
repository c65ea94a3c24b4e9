use crate::dataset::Dataset;
use crate::error::Result;
use crate::logging::LogSink;
use crate::report::IssueRecord;

use super::{Stage, StageOutput};

/// Reports required columns that are absent. Never modifies the dataset.
pub struct RequiredColumnsStage {
    columns: Vec<String>,
}

impl RequiredColumnsStage {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }
}

impl Stage for RequiredColumnsStage {
    fn name(&self) -> &str {
        "required_columns"
    }

    fn apply(&self, dataset: Dataset, log: &dyn LogSink) -> Result<StageOutput> {
        log.debug(&format!("Checking for required columns: {:?}", self.columns));

        let mut missing = dataset.missing_columns(&self.columns);
        missing.sort();
        missing.dedup();

        if missing.is_empty() {
            log.info("All required columns present");
            return Ok(StageOutput::unchanged(dataset));
        }

        log.error(&format!("Missing required columns: {}", missing.join(", ")));
        let issue = IssueRecord::MissingColumns {
            count: missing.len(),
            columns: missing,
        };
        Ok(StageOutput::with_issues(dataset, vec![issue]))
    }
}
