//! Append-only accumulation of issues across one pipeline run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::issue::IssueRecord;

/// A stage-level note, e.g. a stage skipped because of a configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageWarning {
    pub stage: String,
    pub message: String,
}

impl StageWarning {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// Issues and warnings collected stage by stage.
#[derive(Debug, Clone, Default)]
pub struct IssueLedger {
    issues: Vec<IssueRecord>,
    stage_counts: IndexMap<String, usize>,
    warnings: Vec<StageWarning>,
}

impl IssueLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage's issues in the order the stage produced them.
    pub fn record(&mut self, stage: &str, issues: Vec<IssueRecord>) {
        *self.stage_counts.entry(stage.to_string()).or_insert(0) += issues.len();
        self.issues.extend(issues);
    }

    pub fn warn(&mut self, warning: StageWarning) {
        self.warnings.push(warning);
    }

    pub fn issues(&self) -> &[IssueRecord] {
        &self.issues
    }

    pub fn warnings(&self) -> &[StageWarning] {
        &self.warnings
    }

    /// Number of records each stage contributed, in stage order.
    pub fn stage_counts(&self) -> &IndexMap<String, usize> {
        &self.stage_counts
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Sum of record counts per issue type, in first-seen order.
    pub fn counts_by_type(&self) -> IndexMap<String, usize> {
        count_by_type(&self.issues)
    }

    /// Split into issues, per-stage record counts and warnings.
    pub fn into_parts(self) -> (Vec<IssueRecord>, IndexMap<String, usize>, Vec<StageWarning>) {
        (self.issues, self.stage_counts, self.warnings)
    }
}

pub(crate) fn count_by_type(issues: &[IssueRecord]) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for issue in issues {
        *counts.entry(issue.kind().to_string()).or_insert(0) += issue.count();
    }
    counts
}
