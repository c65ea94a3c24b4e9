//! Example: Validate and clean a small in-memory dataset with Assay.
//!
//! Usage:
//!   cargo run --example validate -- [report_path]
//!
//! The report defaults to `quality_report.json` in the working directory.

use std::env;
use std::sync::Arc;

use assay::{Dataset, MemorySink, Pipeline, ValidationConfig, Value};

fn sample_users() -> assay::Result<Dataset> {
    let ids = [1, 2, 2, 3, 4, 5, 6, 7, 8, 9];
    let ages = [
        Some(25),
        Some(150),
        Some(30),
        Some(-5),
        Some(35),
        None,
        Some(28),
        Some(45),
        Some(22),
        Some(1000),
    ];
    let emails = [
        "user1@test.com",
        "invalid-email",
        "user2@test.com",
        "user3@test.com",
        "user4@test.com",
        "user5@test.com",
        "user6@test.com",
        "user7@test.com",
        "user8@test.com",
        "user9@test.com",
    ];
    let salaries = [
        50000, 60000, 55000, 70000, 65000, 80000, 75000, 90000, 5000000, 85000,
    ];

    Dataset::new()
        .with_column("user_id", ids.iter().map(|&i| Value::Int(i)).collect())?
        .with_column(
            "age",
            ages.iter().map(|a| a.map_or(Value::Null, Value::Int)).collect(),
        )?
        .with_column("email", emails.iter().map(|&e| Value::from(e)).collect())?
        .with_column("salary", salaries.iter().map(|&s| Value::Int(s)).collect())
}

fn sample_config() -> assay::Result<ValidationConfig> {
    ValidationConfig::from_json_str(
        r#"{
            "check_duplicates": {"subset": ["user_id"], "keep": "first", "action": "remove"},
            "required_columns": ["user_id", "age", "email"],
            "null_handling": {"age": "fill_median", "salary": "drop_rows"},
            "type_validation": {"user_id": "int", "age": "int", "salary": "float"},
            "range_checks": {"age": {"min": 0, "max": 120, "action": "remove"}},
            "pattern_validation": {
                "email": {
                    "pattern": "^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\\.[a-zA-Z]{2,}$",
                    "action": "flag"
                }
            },
            "outlier_detection": {"salary": {"method": "iqr", "multiplier": 1.5, "action": "flag"}}
        }"#,
    )
}

fn main() -> assay::Result<()> {
    let report_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "quality_report.json".to_string());

    let dataset = sample_users()?;
    let config = sample_config()?;
    let original_shape = (dataset.row_count(), dataset.column_count());

    let sink = Arc::new(MemorySink::new());
    let pipeline = Pipeline::new().with_sink(sink.clone());
    let (cleaned, report) = pipeline.validate_and_clean(dataset, &config)?;

    let separator = "=".repeat(60);
    println!("{}", separator);
    println!("RESULTS SUMMARY");
    println!("{}", separator);
    println!("Original shape: {:?}", original_shape);
    println!(
        "Cleaned shape:  {:?}",
        (cleaned.row_count(), cleaned.column_count())
    );
    println!();
    println!("Checks performed: {}", report.checks_performed.len());
    println!("Issues found: {}", report.issues_found.len());
    for issue in &report.issues_found {
        println!(
            "  {:28} {:10} count={}",
            issue.kind(),
            issue.column().unwrap_or("-"),
            issue.count()
        );
    }
    println!();

    println!("## Log ({} lines)", sink.entries().len());
    for entry in sink.entries() {
        println!("  {:5} {}", entry.level, entry.message);
    }
    println!();

    report.save(&report_path)?;
    println!("Quality report written to: {}", report_path);
    println!("{}", separator);

    println!();
    println!("Cleaned data preview:");
    println!("  {}", cleaned.column_names().join("\t"));
    for row in cleaned.rows().take(5) {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("  {}", cells.join("\t"));
    }

    Ok(())
}
