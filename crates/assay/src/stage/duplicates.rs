//! Duplicate-row detection and removal.

use std::collections::HashMap;

use crate::config::{DuplicateOptions, KeepPolicy};
use crate::dataset::{Dataset, Value};
use crate::error::{AssayError, Result};
use crate::logging::LogSink;
use crate::report::IssueRecord;

use super::{Stage, StageOutput};

pub struct DuplicateStage {
    options: DuplicateOptions,
}

impl DuplicateStage {
    pub fn new(options: DuplicateOptions) -> Self {
        Self { options }
    }

    /// Key columns: the configured subset, or every column.
    fn key_columns(&self, dataset: &Dataset) -> Vec<String> {
        match &self.options.subset {
            Some(subset) if !subset.is_empty() => subset.clone(),
            _ => dataset.column_names().into_iter().map(String::from).collect(),
        }
    }
}

impl Stage for DuplicateStage {
    fn name(&self) -> &str {
        "check_duplicates"
    }

    fn preflight(&self, dataset: &Dataset) -> Result<()> {
        let Some(subset) = &self.options.subset else {
            return Ok(());
        };
        let missing = dataset.missing_columns(subset);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AssayError::MissingColumns {
                stage: self.name().to_string(),
                columns: missing,
            })
        }
    }

    fn apply(&self, dataset: Dataset, log: &dyn LogSink) -> Result<StageOutput> {
        let key_columns = self.key_columns(&dataset);
        log.debug(&format!("Checking duplicates on columns: {:?}", key_columns));

        let drop = duplicate_mask(&dataset, &key_columns, self.options.keep);
        let (dataset, removed) = dataset.drop_rows(&drop);

        if removed == 0 {
            log.info("No duplicates found");
            return Ok(StageOutput::unchanged(dataset));
        }

        log.warn(&format!(
            "Removed {} duplicate rows (keep: {})",
            removed,
            self.options.keep.as_str()
        ));
        let issue = IssueRecord::Duplicates {
            count: removed,
            columns_checked: key_columns,
        };
        Ok(StageOutput::with_issues(dataset, vec![issue]))
    }
}

/// `true` for every row the keep policy removes.
fn duplicate_mask(dataset: &Dataset, key_columns: &[String], keep: KeepPolicy) -> Vec<bool> {
    let columns: Vec<&[Value]> = key_columns
        .iter()
        .filter_map(|name| dataset.column(name))
        .map(|col| col.values())
        .collect();

    let mut groups: HashMap<Vec<&Value>, Vec<usize>> = HashMap::new();
    for row in 0..dataset.row_count() {
        let key: Vec<&Value> = columns.iter().map(|values| &values[row]).collect();
        groups.entry(key).or_default().push(row);
    }

    let mut drop = vec![false; dataset.row_count()];
    for rows in groups.values().filter(|rows| rows.len() > 1) {
        let survivors = match keep {
            KeepPolicy::First => &rows[..1],
            KeepPolicy::Last => &rows[rows.len() - 1..],
            KeepPolicy::None => &rows[..0],
        };
        for &row in rows {
            if !survivors.contains(&row) {
                drop[row] = true;
            }
        }
    }
    drop
}
