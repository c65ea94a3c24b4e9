//! Check-and-remediate stages and the registry that builds them.
//!
//! A stage takes ownership of the dataset, applies its fixed remediation and
//! hands the dataset back together with the issues it found. Stages never see
//! each other; the [`Pipeline`](crate::Pipeline) threads the dataset through
//! them in registry order.

mod duplicates;
mod nulls;
mod outlier;
mod pattern;
mod range;
mod required;
mod types;

use crate::config::ValidationConfig;
use crate::dataset::Dataset;
use crate::error::{AssayError, Result};
use crate::logging::LogSink;
use crate::report::{IssueRecord, StageWarning};

pub use duplicates::DuplicateStage;
pub use nulls::NullHandlingStage;
pub use outlier::OutlierStage;
pub use pattern::PatternStage;
pub use range::RangeStage;
pub use required::RequiredColumnsStage;
pub use types::TypeValidationStage;

/// One independent check-and-remediate step.
pub trait Stage {
    /// Configuration key this stage runs under.
    fn name(&self) -> &str;

    /// Check that the stage can run on this dataset.
    ///
    /// A recoverable error (see [`AssayError::is_recoverable`]) makes the
    /// pipeline skip the stage and record a warning.
    fn preflight(&self, _dataset: &Dataset) -> Result<()> {
        Ok(())
    }

    /// Run the stage.
    fn apply(&self, dataset: Dataset, log: &dyn LogSink) -> Result<StageOutput>;
}

/// What a stage hands back to the pipeline.
#[derive(Debug)]
pub struct StageOutput {
    pub dataset: Dataset,
    pub issues: Vec<IssueRecord>,
    pub warnings: Vec<StageWarning>,
}

impl StageOutput {
    /// Output with no issues.
    pub fn unchanged(dataset: Dataset) -> Self {
        Self {
            dataset,
            issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_issues(dataset: Dataset, issues: Vec<IssueRecord>) -> Self {
        Self {
            dataset,
            issues,
            warnings: Vec::new(),
        }
    }
}

/// Builds a stage from the configuration, or `None` when its key is absent.
pub type StageFactory = Box<dyn Fn(&ValidationConfig) -> Option<Box<dyn Stage>>>;

/// Ordered name → factory table.
pub struct StageRegistry {
    entries: Vec<(String, StageFactory)>,
}

impl StageRegistry {
    /// A registry with no stages.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The seven built-in stages in execution order.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.push("check_duplicates", |config| {
            config
                .check_duplicates
                .clone()
                .map(|options| Box::new(DuplicateStage::new(options)) as Box<dyn Stage>)
        });
        registry.push("required_columns", |config| {
            config
                .required_columns
                .clone()
                .map(|columns| Box::new(RequiredColumnsStage::new(columns)) as Box<dyn Stage>)
        });
        registry.push("null_handling", |config| {
            config
                .null_handling
                .clone()
                .map(|rules| Box::new(NullHandlingStage::new(rules)) as Box<dyn Stage>)
        });
        registry.push("type_validation", |config| {
            config
                .type_validation
                .clone()
                .map(|targets| Box::new(TypeValidationStage::new(targets)) as Box<dyn Stage>)
        });
        registry.push("range_checks", |config| {
            config
                .range_checks
                .clone()
                .map(|rules| Box::new(RangeStage::new(rules)) as Box<dyn Stage>)
        });
        registry.push("pattern_validation", |config| {
            config
                .pattern_validation
                .clone()
                .map(|rules| Box::new(PatternStage::new(rules)) as Box<dyn Stage>)
        });
        registry.push("outlier_detection", |config| {
            config
                .outlier_detection
                .clone()
                .map(|rules| Box::new(OutlierStage::new(rules)) as Box<dyn Stage>)
        });
        registry
    }

    /// Append a custom stage after the existing ones.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn(&ValidationConfig) -> Option<Box<dyn Stage>> + 'static,
    {
        let name = name.into();
        if self.contains(&name) {
            return Err(AssayError::InvalidConfig(format!(
                "a stage named '{}' is already registered",
                name
            )));
        }
        self.entries.push((name, Box::new(factory)));
        Ok(())
    }

    fn push<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&ValidationConfig) -> Option<Box<dyn Stage>> + 'static,
    {
        self.entries.push((name.to_string(), Box::new(factory)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Registered names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Instantiate the stages whose key is present, in execution order.
    pub fn build(&self, config: &ValidationConfig) -> Vec<(String, Box<dyn Stage>)> {
        self.entries
            .iter()
            .filter_map(|(name, factory)| factory(config).map(|stage| (name.clone(), stage)))
            .collect()
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.names())
            .finish()
    }
}

/// Log a per-column warning for a column the dataset does not have.
pub(crate) fn skip_missing_column(log: &dyn LogSink, stage: &str, column: &str) {
    log.warn(&format!(
        "Column '{}' not found, skipping {} for this column",
        column, stage
    ));
}
