//! Fuzz target for the full pipeline on structured random datasets.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use assay::config::{
    DuplicateOptions, KeepPolicy, NullStrategy, OutlierRule, RangeRule, TargetType,
};
use assay::{Dataset, Pipeline, ValidationConfig, Value};

#[derive(Debug, Arbitrary)]
enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Null => Value::Null,
            Cell::Int(i) => Value::Int(i),
            Cell::Float(f) => Value::Float(f),
            Cell::Text(s) => Value::Str(s),
            Cell::Bool(b) => Value::Bool(b),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    rows: Vec<(Cell, Cell)>,
    keep: u8,
    strategy: u8,
    target: u8,
    min: f64,
    max: f64,
    zscore: bool,
    threshold: Option<f64>,
}

fuzz_target!(|input: Input| {
    if input.rows.len() > 2_000 {
        return;
    }

    let (a, b): (Vec<Value>, Vec<Value>) = input
        .rows
        .into_iter()
        .map(|(x, y)| (Value::from(x), Value::from(y)))
        .unzip();
    let Ok(dataset) = Dataset::new().with_column("a", a).and_then(|d| d.with_column("b", b)) else {
        return;
    };

    let keep = match input.keep % 3 {
        0 => KeepPolicy::First,
        1 => KeepPolicy::Last,
        _ => KeepPolicy::None,
    };
    let strategy = match input.strategy % 6 {
        0 => NullStrategy::DropRow,
        1 => NullStrategy::FillMean,
        2 => NullStrategy::FillMedian,
        3 => NullStrategy::FillMode,
        4 => NullStrategy::FillForward,
        _ => NullStrategy::FillBackward,
    };
    let target = match input.target % 5 {
        0 => TargetType::Int,
        1 => TargetType::Float,
        2 => TargetType::String,
        3 => TargetType::DateTime,
        _ => TargetType::Bool,
    };
    let mut outlier = if input.zscore { OutlierRule::zscore() } else { OutlierRule::iqr() };
    if let Some(t) = input.threshold.filter(|t| t.is_finite() && *t > 0.0) {
        outlier = outlier.with_threshold(t);
    }

    let mut config = ValidationConfig::new()
        .with_duplicates(DuplicateOptions::default().with_keep(keep))
        .with_null_strategy("a", strategy)
        .with_type("b", target)
        .with_outlier("a", outlier);
    if input.min <= input.max {
        config = config.with_range("a", RangeRule::new(Some(input.min), Some(input.max)));
    }

    let rows = dataset.row_count();
    let (cleaned, report) = Pipeline::new()
        .validate_and_clean(dataset, &config)
        .expect("built-in stages never fail on valid configuration");
    assert_eq!(report.rows_processed, rows);
    assert_eq!(report.rows_cleaned, cleaned.row_count());
});
