//! Property-based tests for the Assay pipeline.
//!
//! These tests use proptest to generate random datasets and configurations and
//! verify that the pipeline maintains its invariants under all conditions.
//!
//! # Testing Philosophy
//!
//! Property-based tests verify:
//! 1. **No panics**: Parsing and validation never crash on any input
//! 2. **Row accounting**: Reported row counts always match the datasets
//! 3. **Idempotence**: Cleaning already-clean output changes nothing
//! 4. **Ordering**: Stages run in a fixed order regardless of configuration order
//!
//! # Running Property Tests
//!
//! ```bash
//! # Run all property tests
//! cargo test -p assay --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p assay --test property_tests
//! ```

use proptest::prelude::*;

use assay::config::{BUILTIN_STAGES, DuplicateOptions, NullStrategy, RangeRule};
use assay::{Dataset, IssueRecord, Parser, Pipeline, ValidationConfig, Value};

// =============================================================================
// Test Strategies
// =============================================================================

/// A nullable small integer cell.
fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => (-20i64..200).prop_map(Value::Int),
        1 => Just(Value::Null),
    ]
}

/// A three-column dataset (`id`, `age`, `code`) with 0-40 rows.
fn dataset() -> impl Strategy<Value = Dataset> {
    (0usize..40).prop_flat_map(|rows| {
        (
            prop::collection::vec(0i64..10, rows),
            prop::collection::vec(cell(), rows),
            prop::collection::vec("[a-c]{1,3}", rows),
        )
            .prop_map(|(ids, ages, codes)| {
                Dataset::new()
                    .with_column("id", ids.into_iter().map(Value::Int).collect())
                    .unwrap()
                    .with_column("age", ages)
                    .unwrap()
                    .with_column("code", codes.into_iter().map(Value::from).collect())
                    .unwrap()
            })
    })
}

fn null_strategy() -> impl Strategy<Value = NullStrategy> {
    prop_oneof![
        Just(NullStrategy::DropRow),
        Just(NullStrategy::FillMean),
        Just(NullStrategy::FillMedian),
        Just(NullStrategy::FillMode),
        Just(NullStrategy::FillValue(Value::Int(0))),
    ]
}

/// Any combination of the built-in stages over the generated columns.
fn config() -> impl Strategy<Value = ValidationConfig> {
    (
        any::<bool>(),
        any::<bool>(),
        prop::option::of(null_strategy()),
        any::<bool>(),
        prop::option::of((0.0f64..50.0, 50.0f64..150.0)),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(dups, required, nulls, types, range, pattern, outliers)| {
            let mut config = ValidationConfig::new();
            if dups {
                config = config.with_duplicates(DuplicateOptions::on(["id", "code"]));
            }
            if required {
                config = config.with_required_columns(["id", "age", "email"]);
            }
            if let Some(strategy) = nulls {
                config = config.with_null_strategy("age", strategy);
            }
            if types {
                config = config.with_type("age", assay::config::TargetType::Float);
            }
            if let Some((min, max)) = range {
                config = config.with_range("age", RangeRule::between(min, max));
            }
            if pattern {
                config = config.with_pattern("code", "^a").unwrap();
            }
            if outliers {
                config = config.with_outlier("age", assay::config::OutlierRule::iqr());
            }
            config
        })
}

// =============================================================================
// Pipeline Properties
// =============================================================================

proptest! {
    /// The report's row counts always describe the actual input and output.
    #[test]
    fn row_counts_match_datasets(data in dataset(), config in config()) {
        let rows_in = data.row_count();
        let (cleaned, report) = Pipeline::new().validate_and_clean(data, &config).unwrap();

        prop_assert_eq!(report.rows_processed, rows_in);
        prop_assert_eq!(report.rows_cleaned, cleaned.row_count());
        prop_assert!(report.rows_cleaned <= report.rows_processed);
    }

    /// Every column of the cleaned dataset has the same length.
    #[test]
    fn columns_stay_aligned(data in dataset(), config in config()) {
        let (cleaned, _) = Pipeline::new().validate_and_clean(data, &config).unwrap();
        let rows = cleaned.row_count();
        for (_, column) in cleaned.columns() {
            prop_assert_eq!(column.len(), rows);
        }
    }

    /// `checks_performed` lists exactly the present stage keys, in fixed order.
    #[test]
    fn checks_follow_fixed_order(data in dataset(), config in config()) {
        let (_, report) = Pipeline::new().validate_and_clean(data, &config).unwrap();
        let expected: Vec<String> = BUILTIN_STAGES
            .iter()
            .filter(|key| config.has_stage(key))
            .map(|key| key.to_string())
            .collect();
        prop_assert_eq!(report.checks_performed, expected);
    }

    /// Every issue record reports a positive count.
    #[test]
    fn issues_have_positive_counts(data in dataset(), config in config()) {
        let (_, report) = Pipeline::new().validate_and_clean(data, &config).unwrap();
        for issue in &report.issues_found {
            prop_assert!(issue.count() > 0, "zero-count issue: {:?}", issue);
        }
    }

    /// Duplicate, range and pattern removal find nothing on their own output.
    #[test]
    fn removal_stages_are_idempotent(
        data in dataset(),
        min in 0.0f64..50.0,
        max in 50.0f64..150.0,
    ) {
        let config = ValidationConfig::new()
            .with_duplicates(DuplicateOptions::default())
            .with_range("age", RangeRule::between(min, max))
            .with_pattern("code", "b")
            .unwrap();

        let pipeline = Pipeline::new();
        let (once, _) = pipeline.validate_and_clean(data, &config).unwrap();
        let (twice, report) = pipeline.validate_and_clean(once.clone(), &config).unwrap();

        prop_assert_eq!(twice, once);
        prop_assert!(report.issues_found.is_empty());
    }

    /// Once nulls are filled, a second null-handling pass reports nothing.
    #[test]
    fn null_fill_is_idempotent(data in dataset()) {
        let config = ValidationConfig::new()
            .with_null_strategy("age", NullStrategy::FillValue(Value::Int(-1)));
        let pipeline = Pipeline::new();
        let (once, _) = pipeline.validate_and_clean(data, &config).unwrap();
        let (twice, report) = pipeline.validate_and_clean(once.clone(), &config).unwrap();

        prop_assert_eq!(twice, once);
        prop_assert!(report.issues_found.is_empty());
    }

    /// Adding a stage that matches nothing leaves other stages' records unchanged.
    #[test]
    fn stages_are_independent(data in dataset(), min in 0.0f64..50.0, max in 50.0f64..150.0) {
        let base = ValidationConfig::new()
            .with_duplicates(DuplicateOptions::on(["id", "code"]))
            .with_range("age", RangeRule::between(min, max));
        // Every generated code matches, so this stage records nothing.
        let with_noop_pattern = base.clone().with_pattern("code", "^[a-c]+$").unwrap();

        let (a, report_a) = Pipeline::new().validate_and_clean(data.clone(), &base).unwrap();
        let (b, report_b) = Pipeline::new().validate_and_clean(data, &with_noop_pattern).unwrap();

        prop_assert_eq!(a, b);
        prop_assert_eq!(report_a.issues_found, report_b.issues_found);
    }

    /// Range checks never leave an out-of-range numeric value behind.
    #[test]
    fn range_output_is_within_bounds(
        data in dataset(),
        min in 0.0f64..50.0,
        max in 50.0f64..150.0,
    ) {
        let config = ValidationConfig::new().with_range("age", RangeRule::between(min, max));
        let (cleaned, report) = Pipeline::new().validate_and_clean(data, &config).unwrap();

        for value in cleaned.column("age").unwrap().values() {
            if let Some(x) = value.as_f64() {
                prop_assert!(x >= min && x <= max);
            }
        }
        let removed: usize = report
            .issues_found
            .iter()
            .filter(|i| matches!(i, IssueRecord::RangeViolation { .. }))
            .map(IssueRecord::count)
            .sum();
        prop_assert_eq!(removed, report.rows_removed());
    }
}

// =============================================================================
// Parser Properties
// =============================================================================

proptest! {
    /// The parser never panics on arbitrary text.
    #[test]
    fn parser_never_panics(text in "[a-z0-9,;\t\"\n .-]{0,200}") {
        let _ = Parser::new().parse_str(&text);
    }

    /// Rectangular CSV input parses to the declared shape.
    #[test]
    fn parser_preserves_shape(
        rows in prop::collection::vec(prop::collection::vec(0i64..1000, 3), 1..30),
    ) {
        let mut text = String::from("a,b,c\n");
        for row in &rows {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            text.push_str(&line.join(","));
            text.push('\n');
        }

        let data = Parser::new().parse_str(&text).unwrap();
        prop_assert_eq!(data.column_count(), 3);
        prop_assert_eq!(data.row_count(), rows.len());
        prop_assert_eq!(data.column("b").unwrap().values()[0].clone(), Value::Int(rows[0][1]));
    }
}
