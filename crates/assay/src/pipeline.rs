//! The pipeline orchestrator and public entry point.

use std::path::Path;
use std::sync::Arc;

use crate::config::ValidationConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::logging::{LogSink, NoopSink};
use crate::report::{IssueLedger, QualityReport, StageWarning};
use crate::stage::{Stage, StageRegistry};

/// Result of validating a file on disk.
#[derive(Debug)]
pub struct FileValidation {
    /// Metadata about the loaded file.
    pub source: SourceMetadata,
    /// The cleaned dataset.
    pub dataset: Dataset,
    /// The audit report.
    pub report: QualityReport,
}

/// Runs the configured stages over a dataset, in registry order.
///
/// A pipeline holds no per-run state: every call to
/// [`validate_and_clean`](Pipeline::validate_and_clean) starts with a fresh
/// ledger, so one pipeline can be reused across datasets.
pub struct Pipeline {
    registry: StageRegistry,
    parser: Parser,
    sink: Arc<dyn LogSink>,
}

impl Pipeline {
    /// A pipeline with the built-in stages and no logging.
    pub fn new() -> Self {
        Self {
            registry: StageRegistry::builtin(),
            parser: Parser::new(),
            sink: Arc::new(NoopSink),
        }
    }

    /// Send progress messages to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the stage registry.
    pub fn with_registry(mut self, registry: StageRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Parser settings used by [`validate_file`](Pipeline::validate_file).
    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.parser = Parser::with_config(config);
        self
    }

    /// Register a custom stage that runs after the existing ones.
    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Result<Self>
    where
        F: Fn(&ValidationConfig) -> Option<Box<dyn Stage>> + 'static,
    {
        self.registry.register(name, factory)?;
        Ok(self)
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Configuration keys that neither a built-in nor a registered stage handles.
    pub fn unhandled_keys<'a>(&self, config: &'a ValidationConfig) -> Vec<&'a str> {
        config
            .ignored_keys()
            .into_iter()
            .filter(|key| !self.registry.contains(key))
            .collect()
    }

    /// Validate and clean a dataset.
    ///
    /// Stages whose configuration key is absent are skipped. A stage whose
    /// preflight reports a recoverable error (a load-bearing column is
    /// missing) is skipped with a warning in the report; any other error
    /// aborts the run.
    pub fn validate_and_clean(
        &self,
        dataset: Dataset,
        config: &ValidationConfig,
    ) -> Result<(Dataset, QualityReport)> {
        let log = self.sink.as_ref();
        let rows_processed = dataset.row_count();

        log.info(&format!(
            "Starting validation pipeline on {} rows x {} columns",
            rows_processed,
            dataset.column_count()
        ));
        log.debug(&format!("Columns: {:?}", dataset.column_names()));
        for key in self.unhandled_keys(config) {
            log.info(&format!("Ignoring unrecognised configuration key '{}'", key));
        }

        let mut dataset = dataset;
        let mut ledger = IssueLedger::new();
        let mut checks_performed = Vec::new();

        for (name, stage) in self.registry.build(config) {
            checks_performed.push(name.clone());
            log.info(&format!("Running {}...", name));

            if let Err(err) = stage.preflight(&dataset) {
                if !err.is_recoverable() {
                    return Err(err);
                }
                log.warn(&format!("Skipping {}: {}", name, err));
                ledger.record(&name, Vec::new());
                ledger.warn(StageWarning::new(&name, err.to_string()));
                continue;
            }

            let rows_before = dataset.row_count();
            let output = stage.apply(dataset, log)?;
            dataset = output.dataset;

            log.info(&format!(
                "{} finished: {} issue(s), {} row(s) removed",
                name,
                output.issues.len(),
                rows_before.saturating_sub(dataset.row_count())
            ));
            ledger.record(&name, output.issues);
            for warning in output.warnings {
                ledger.warn(warning);
            }
        }

        let report =
            QualityReport::new(checks_performed, ledger, rows_processed, dataset.row_count());
        log.info(&format!(
            "Validation complete: {} rows in, {} rows out, {} issue(s)",
            report.rows_processed,
            report.rows_cleaned,
            report.issues_found.len()
        ));

        Ok((dataset, report))
    }

    /// Load a delimited file and validate it.
    pub fn validate_file(
        &self,
        path: impl AsRef<Path>,
        config: &ValidationConfig,
    ) -> Result<FileValidation> {
        let (dataset, source) = self.parser.parse_file(path)?;
        self.sink.info(&format!(
            "Loaded {} ({}, {} rows, {})",
            source.file, source.format, source.row_count, source.hash
        ));
        let (dataset, report) = self.validate_and_clean(dataset, config)?;
        Ok(FileValidation {
            source,
            dataset,
            report,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicateOptions, NullStrategy, OutlierRule, RangeRule};
    use crate::dataset::Value;
    use crate::error::AssayError;
    use crate::logging::{Level, MemorySink};
    use crate::report::IssueRecord;
    use crate::stage::StageOutput;

    fn users() -> Dataset {
        Dataset::new()
            .with_column(
                "id",
                vec![Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(3)],
            )
            .unwrap()
            .with_column(
                "age",
                vec![Value::Int(25), Value::Int(25), Value::Null, Value::Int(150)],
            )
            .unwrap()
    }

    #[test]
    fn test_empty_config_is_identity() {
        let (cleaned, report) = Pipeline::new()
            .validate_and_clean(users(), &ValidationConfig::new())
            .unwrap();
        assert_eq!(cleaned, users());
        assert!(report.checks_performed.is_empty());
        assert!(report.issues_found.is_empty());
        assert_eq!(report.rows_processed, 4);
        assert_eq!(report.rows_cleaned, 4);
    }

    #[test]
    fn test_stages_run_in_fixed_order() {
        let config = ValidationConfig::new()
            .with_range("age", RangeRule::between(0.0, 120.0))
            .with_null_strategy("age", NullStrategy::FillMedian)
            .with_duplicates(DuplicateOptions::on(["id"]));

        let (cleaned, report) = Pipeline::new().validate_and_clean(users(), &config).unwrap();

        assert_eq!(
            report.checks_performed,
            vec!["check_duplicates", "null_handling", "range_checks"]
        );
        let kinds: Vec<&str> = report.issues_found.iter().map(IssueRecord::kind).collect();
        assert_eq!(kinds, vec!["duplicates", "null_values", "range_violation"]);
        assert_eq!(cleaned.row_count(), 2);
        assert_eq!(report.rows_cleaned, 2);
    }

    #[test]
    fn test_missing_duplicate_subset_becomes_warning() {
        let config = ValidationConfig::new()
            .with_duplicates(DuplicateOptions::on(["email"]))
            .with_range("age", RangeRule::between(0.0, 120.0));

        let (cleaned, report) = Pipeline::new().validate_and_clean(users(), &config).unwrap();

        assert_eq!(report.checks_performed, vec!["check_duplicates", "range_checks"]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].stage, "check_duplicates");
        assert!(report.warnings[0].message.contains("email"));
        assert_eq!(cleaned.row_count(), 3);
        assert_eq!(report.issues_per_check["check_duplicates"], 0);
        assert_eq!(report.issues_per_check["range_checks"], 1);
    }

    #[test]
    fn test_invalid_programmatic_rules_abort_run() {
        let inverted = ValidationConfig::new().with_range("age", RangeRule::between(3.0, 2.0));
        let err = Pipeline::new().validate_and_clean(users(), &inverted).unwrap_err();
        assert!(matches!(err, AssayError::InvalidConfig(_)));

        let negative = ValidationConfig::new()
            .with_outlier("age", OutlierRule::zscore().with_threshold(-1.0));
        let err = Pipeline::new().validate_and_clean(users(), &negative).unwrap_err();
        assert!(matches!(err, AssayError::InvalidConfig(_)));
    }

    #[test]
    fn test_sink_receives_progress_without_changing_output() {
        let config = ValidationConfig::new()
            .with_outlier("age", OutlierRule::zscore())
            .with_null_strategy("missing", NullStrategy::FillMean);

        let sink = Arc::new(MemorySink::new());
        let logged = Pipeline::new().with_sink(sink.clone());
        let (with_sink, mut report_a) = logged.validate_and_clean(users(), &config).unwrap();
        let (without_sink, report_b) =
            Pipeline::new().validate_and_clean(users(), &config).unwrap();

        report_a.timestamp = report_b.timestamp;
        assert_eq!(with_sink, without_sink);
        assert_eq!(report_a, report_b);
        assert!(!sink.messages_at(Level::INFO).is_empty());
        assert!(
            sink.messages_at(Level::WARN)
                .iter()
                .any(|m| m.contains("'missing'"))
        );
    }

    struct Failing;

    impl Stage for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn preflight(&self, _dataset: &Dataset) -> Result<()> {
            Err(AssayError::InvalidConfig("bad options".to_string()))
        }

        fn apply(&self, dataset: Dataset, _log: &dyn LogSink) -> Result<StageOutput> {
            Ok(StageOutput::unchanged(dataset))
        }
    }

    #[test]
    fn test_unrecoverable_preflight_error_aborts() {
        let pipeline = Pipeline::new()
            .register("failing", |_| Some(Box::new(Failing) as Box<dyn Stage>))
            .unwrap();
        let err = pipeline
            .validate_and_clean(users(), &ValidationConfig::new())
            .unwrap_err();
        assert!(matches!(err, AssayError::InvalidConfig(_)));
    }

    #[test]
    fn test_unhandled_keys_exclude_registered_stages() {
        let config = ValidationConfig::new()
            .with_extension("failing", serde_json::json!({}))
            .with_extension("legacy_option", serde_json::json!(true));
        let pipeline = Pipeline::new()
            .register("failing", |_| None)
            .unwrap();
        assert_eq!(pipeline.unhandled_keys(&config), vec!["legacy_option"]);
    }
}
