//! Null counting and remediation.

use indexmap::IndexMap;

use crate::config::NullStrategy;
use crate::dataset::{Dataset, Value, stats};
use crate::error::Result;
use crate::logging::LogSink;
use crate::report::{IssueRecord, percentage};

use super::{Stage, StageOutput, skip_missing_column};

/// Applies a null strategy per column, in configuration order.
///
/// Null counts and percentages are taken from the dataset as it stands when
/// the column is reached, so a `drop_row` on an earlier column shrinks the
/// denominator for later ones.
pub struct NullHandlingStage {
    rules: IndexMap<String, NullStrategy>,
}

impl NullHandlingStage {
    pub fn new(rules: IndexMap<String, NullStrategy>) -> Self {
        Self { rules }
    }
}

impl Stage for NullHandlingStage {
    fn name(&self) -> &str {
        "null_handling"
    }

    fn apply(&self, mut dataset: Dataset, log: &dyn LogSink) -> Result<StageOutput> {
        let mut issues = Vec::new();

        for (name, strategy) in &self.rules {
            let Some(column) = dataset.column(name) else {
                skip_missing_column(log, self.name(), name);
                continue;
            };

            let null_count = column.null_count();
            if null_count == 0 {
                log.debug(&format!("Column '{}': no null values", name));
                continue;
            }

            let pct = percentage(null_count, dataset.row_count());
            log.warn(&format!(
                "Column '{}': {} null values ({:.2}%) - strategy: {}",
                name, null_count, pct, strategy
            ));
            issues.push(IssueRecord::NullValues {
                column: name.clone(),
                count: null_count,
                percentage: pct,
                strategy: strategy.name().to_string(),
            });

            dataset = remediate(dataset, name, strategy, log);
        }

        Ok(StageOutput::with_issues(dataset, issues))
    }
}

fn remediate(dataset: Dataset, name: &str, strategy: &NullStrategy, log: &dyn LogSink) -> Dataset {
    if let NullStrategy::DropRow = strategy {
        let Some(mask) = dataset.column(name).map(|c| c.null_mask()) else {
            return dataset;
        };
        let (dataset, dropped) = dataset.drop_rows(&mask);
        log.info(&format!("Dropped {} rows with null values in '{}'", dropped, name));
        return dataset;
    }

    let mut dataset = dataset;
    let Some(column) = dataset.column_mut(name) else {
        return dataset;
    };

    match strategy {
        NullStrategy::DropRow => {}
        NullStrategy::FillMean | NullStrategy::FillMedian => {
            let values = column.numeric_values();
            let statistic = match strategy {
                NullStrategy::FillMean => stats::mean(&values),
                _ => stats::median(&values),
            };
            match statistic {
                Some(fill) => {
                    let filled = column.fill_nulls(&Value::Float(fill));
                    log.info(&format!(
                        "Filled {} nulls in '{}' with {}: {:.2}",
                        filled, name, strategy, fill
                    ));
                }
                None => log.warn(&format!(
                    "Column '{}' has no numeric values; {} left nulls in place",
                    name, strategy
                )),
            }
        }
        NullStrategy::FillMode => match column.mode() {
            Some(mode) => {
                let filled = column.fill_nulls(&mode);
                log.info(&format!("Filled {} nulls in '{}' with mode: {}", filled, name, mode));
            }
            None => log.warn(&format!("Column '{}' has no values to take a mode from", name)),
        },
        NullStrategy::FillForward => {
            let filled = column.fill_forward();
            log.info(&format!("Forward-filled {} nulls in '{}'", filled, name));
        }
        NullStrategy::FillBackward => {
            let filled = column.fill_backward();
            log.info(&format!("Backward-filled {} nulls in '{}'", filled, name));
        }
        NullStrategy::FillValue(value) => {
            let filled = column.fill_nulls(value);
            log.info(&format!(
                "Filled {} nulls in '{}' with custom value: {}",
                filled, name, value
            ));
        }
    }

    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnType;
    use crate::logging::{Level, MemorySink, NoopSink};
    use crate::stage::test_support::{column, opt_ints};

    fn run(data: Dataset, column: &str, strategy: NullStrategy) -> StageOutput {
        let mut rules = IndexMap::new();
        rules.insert(column.to_string(), strategy);
        NullHandlingStage::new(rules).apply(data, &NoopSink).unwrap()
    }

    #[test]
    fn test_fill_median() {
        let data = column("age", opt_ints(&[Some(10), None, Some(30)]));
        let output = run(data, "age", NullStrategy::FillMedian);

        assert_eq!(
            output.dataset.column("age").unwrap().values(),
            &[Value::Int(10), Value::Int(20), Value::Int(30)]
        );
        assert_eq!(
            output.issues,
            vec![IssueRecord::NullValues {
                column: "age".to_string(),
                count: 1,
                percentage: 33.33,
                strategy: "fill_median".to_string(),
            }]
        );
    }

    #[test]
    fn test_fill_mean_widens_to_float() {
        let data = column("x", opt_ints(&[Some(1), None, Some(2)]));
        let output = run(data, "x", NullStrategy::FillMean);
        let col = output.dataset.column("x").unwrap();
        assert_eq!(col.dtype(), ColumnType::Float);
        assert_eq!(col.values()[1], Value::Float(1.5));
    }

    #[test]
    fn test_drop_row() {
        let data = column("x", opt_ints(&[None, Some(1), None]));
        let output = run(data, "x", NullStrategy::DropRow);
        assert_eq!(output.dataset.row_count(), 1);
        assert_eq!(output.issues[0].count(), 2);
    }

    #[test]
    fn test_forward_and_backward_fill_leave_edges() {
        let values = opt_ints(&[None, Some(1), None, Some(3), None]);

        let forward = run(column("x", values.clone()), "x", NullStrategy::FillForward);
        assert_eq!(
            forward.dataset.column("x").unwrap().values(),
            opt_ints(&[None, Some(1), Some(1), Some(3), Some(3)]).as_slice()
        );

        let backward = run(column("x", values), "x", NullStrategy::FillBackward);
        assert_eq!(
            backward.dataset.column("x").unwrap().values(),
            opt_ints(&[Some(1), Some(1), Some(3), Some(3), None]).as_slice()
        );
    }

    #[test]
    fn test_fill_mode_and_value() {
        let data = column(
            "city",
            vec![Value::from("Paris"), Value::Null, Value::from("Oslo"), Value::from("Oslo")],
        );
        let mode = run(data.clone(), "city", NullStrategy::FillMode);
        assert_eq!(mode.dataset.column("city").unwrap().values()[1], Value::from("Oslo"));

        let constant = run(data, "city", NullStrategy::FillValue(Value::from("unknown")));
        assert_eq!(
            constant.dataset.column("city").unwrap().values()[1],
            Value::from("unknown")
        );
        assert_eq!(
            constant.issues[0],
            IssueRecord::NullValues {
                column: "city".to_string(),
                count: 1,
                percentage: 25.0,
                strategy: "fill_value".to_string(),
            }
        );
    }

    #[test]
    fn test_all_null_mean_is_noop_but_reported() {
        let data = column("x", vec![Value::Null, Value::Null]);
        let output = run(data, "x", NullStrategy::FillMean);
        assert_eq!(output.dataset.column("x").unwrap().null_count(), 2);
        assert_eq!(output.issues.len(), 1);
        assert_eq!(output.issues[0].count(), 2);
    }

    #[test]
    fn test_missing_column_is_noop_with_warning() {
        let data = column("x", opt_ints(&[None]));
        let mut rules = IndexMap::new();
        rules.insert("y".to_string(), NullStrategy::FillMean);
        let sink = MemorySink::new();
        let output = NullHandlingStage::new(rules).apply(data.clone(), &sink).unwrap();

        assert_eq!(output.dataset, data);
        assert!(output.issues.is_empty());
        assert_eq!(sink.messages_at(Level::WARN).len(), 1);
    }

    #[test]
    fn test_percentage_uses_rows_at_stage_time() {
        let data = Dataset::new()
            .with_column("a", opt_ints(&[None, Some(1), Some(2), Some(3)]))
            .unwrap()
            .with_column("b", opt_ints(&[Some(1), None, Some(2), Some(3)]))
            .unwrap();
        let mut rules = IndexMap::new();
        rules.insert("a".to_string(), NullStrategy::DropRow);
        rules.insert("b".to_string(), NullStrategy::DropRow);
        let output = NullHandlingStage::new(rules).apply(data, &NoopSink).unwrap();

        assert_eq!(output.dataset.row_count(), 2);
        match &output.issues[1] {
            IssueRecord::NullValues { percentage, .. } => assert_eq!(*percentage, 33.33),
            other => panic!("unexpected issue: {other:?}"),
        }
    }
}
