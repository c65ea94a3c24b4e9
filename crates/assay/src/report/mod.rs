//! Issue records, the per-run ledger and the final quality report.

mod issue;
mod ledger;
mod persistence;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use issue::{IssueRecord, percentage};
pub use ledger::{IssueLedger, StageWarning};

/// Audit report produced by one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// When the run finished.
    pub timestamp: DateTime<Utc>,

    /// Stage names whose configuration key was present, in execution order.
    pub checks_performed: Vec<String>,

    /// Every issue, grouped by stage in execution order.
    pub issues_found: Vec<IssueRecord>,

    /// Rows in the input dataset.
    pub rows_processed: usize,

    /// Rows in the cleaned dataset.
    pub rows_cleaned: usize,

    /// Issue records each check contributed, in execution order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub issues_per_check: IndexMap<String, usize>,

    /// Stage-level warnings (skipped stages).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<StageWarning>,
}

/// Aggregate view of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub checks_run: usize,
    pub issue_records: usize,
    pub affected: usize,
    pub by_type: IndexMap<String, usize>,
    pub rows_processed: usize,
    pub rows_cleaned: usize,
    pub rows_removed: usize,
    pub warnings: usize,
}

impl QualityReport {
    /// Assemble a report from a finished ledger.
    pub fn new(
        checks_performed: Vec<String>,
        ledger: IssueLedger,
        rows_processed: usize,
        rows_cleaned: usize,
    ) -> Self {
        let (issues_found, issues_per_check, warnings) = ledger.into_parts();
        Self {
            timestamp: Utc::now(),
            checks_performed,
            issues_found,
            rows_processed,
            rows_cleaned,
            issues_per_check,
            warnings,
        }
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_processed.saturating_sub(self.rows_cleaned)
    }

    pub fn has_issues(&self) -> bool {
        !self.issues_found.is_empty()
    }

    /// Issues with the given `type` tag.
    pub fn issues_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a IssueRecord> + 'a {
        self.issues_found.iter().filter(move |i| i.kind() == kind)
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            checks_run: self.checks_performed.len(),
            issue_records: self.issues_found.len(),
            affected: self.issues_found.iter().map(IssueRecord::count).sum(),
            by_type: ledger::count_by_type(&self.issues_found),
            rows_processed: self.rows_processed,
            rows_cleaned: self.rows_cleaned,
            rows_removed: self.rows_removed(),
            warnings: self.warnings.len(),
        }
    }

    /// Pretty JSON text of the report.
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
