//! Validate command - run the pipeline over a data file and export results.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assay::input::{write_delimited, write_json};
use assay::{Pipeline, QualityReport, TracingSink, ValidationConfig};
use colored::Colorize;

use crate::cli::OutputFormat;

pub fn run(
    file: PathBuf,
    config_path: PathBuf,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    report_path: Option<PathBuf>,
    strict: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    if !config_path.exists() {
        return Err(format!("Config file not found: {}", config_path.display()).into());
    }

    let config = ValidationConfig::from_json_file(&config_path)?;
    tracing::debug!(
        config = %config_path.display(),
        stages = ?config.enabled_stages(),
        "Loaded configuration"
    );
    let pipeline = Pipeline::new().with_sink(Arc::new(TracingSink));

    let unhandled = pipeline.unhandled_keys(&config);
    if strict && !unhandled.is_empty() {
        return Err(format!(
            "Unrecognised configuration keys: {}",
            unhandled.join(", ")
        )
        .into());
    }

    println!(
        "{} {}",
        "Validating".cyan().bold(),
        file.display().to_string().white()
    );

    let result = pipeline.validate_file(&file, &config)?;

    let format = format.unwrap_or_else(|| OutputFormat::for_source(&result.source.format));
    let output_path = output.unwrap_or_else(|| default_output_path(&file, format));
    match format {
        OutputFormat::Csv => write_delimited(&result.dataset, &output_path, b',')?,
        OutputFormat::Tsv => write_delimited(&result.dataset, &output_path, b'\t')?,
        OutputFormat::Json => write_json(&result.dataset, &output_path)?,
    }

    let report_path = report_path.unwrap_or_else(|| default_report_path(&file));
    result.report.save(&report_path)?;

    print_summary(&result.report, &unhandled, verbose);

    println!();
    println!(
        "{} {}",
        "Cleaned data saved to".green().bold(),
        output_path.display().to_string().white()
    );
    println!(
        "{} {}",
        "Quality report saved to".green().bold(),
        report_path.display().to_string().white()
    );

    Ok(())
}

/// `<stem>_cleaned.<ext>` next to the input.
pub fn default_output_path(file: &Path, format: OutputFormat) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}_cleaned.{}", stem, format.extension()))
}

/// `<stem>.quality.json` next to the input.
pub fn default_report_path(file: &Path) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}.quality.json", stem))
}

fn print_summary(report: &QualityReport, unhandled: &[&str], verbose: bool) {
    println!();
    println!(
        "Rows: {} in, {} out ({} removed)",
        report.rows_processed.to_string().white().bold(),
        report.rows_cleaned.to_string().white().bold(),
        report.rows_removed().to_string().red()
    );

    if verbose {
        println!();
        println!("{}", "Checks performed:".yellow().bold());
        for check in &report.checks_performed {
            match report.issues_per_check.get(check) {
                Some(count) => println!("  {:26} {}", check, count),
                None => println!("  {}", check),
            }
        }
    } else {
        println!("Checks performed: {}", report.checks_performed.len());
    }

    println!();
    if report.has_issues() {
        println!(
            "{} ({})",
            "Issues found:".yellow().bold(),
            report.issues_found.len()
        );
        for issue in &report.issues_found {
            let count = if issue.removes_rows() {
                issue.count().to_string().red()
            } else {
                issue.count().to_string().yellow()
            };
            println!(
                "  {:26} {:16} {}",
                issue.kind(),
                issue.column().unwrap_or("-"),
                count
            );
        }
    } else {
        println!("{}", "No issues found - data looks clean!".green());
    }

    if !report.warnings.is_empty() {
        println!();
        println!("{}", "Warnings:".yellow().bold());
        for warning in &report.warnings {
            println!("  [{}] {}", warning.stage, warning.message);
        }
    }

    if !unhandled.is_empty() {
        println!();
        println!(
            "{} {}",
            "Ignored configuration keys:".yellow(),
            unhandled.join(", ")
        );
    }
}
