//! Inspect command - show the shape of a data file as the pipeline sees it.

use std::path::PathBuf;

use assay::Parser;
use assay::report::percentage;
use colored::Colorize;

pub fn run(
    file: PathBuf,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let (dataset, source) = Parser::new().parse_file(&file)?;
    let rows = dataset.row_count();

    if json_output {
        let columns: Vec<_> = dataset
            .columns()
            .map(|(name, column)| {
                serde_json::json!({
                    "name": name,
                    "type": column.dtype().to_string(),
                    "null_count": column.null_count(),
                    "null_percentage": percentage(column.null_count(), rows),
                })
            })
            .collect();
        let status = serde_json::json!({
            "source": source,
            "columns": columns,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {} ({}, {} rows x {} columns)",
        "Inspecting".cyan().bold(),
        source.file.white(),
        source.format,
        source.row_count,
        source.column_count
    );
    if verbose {
        println!("  sha256: {}", source.hash.dimmed());
        println!("  size:   {} bytes", source.size_bytes);
    }
    println!();

    println!(
        "  {:24} {:10} {:>8} {:>8}",
        "column".bold(),
        "type".bold(),
        "nulls".bold(),
        "null %".bold()
    );
    for (name, column) in dataset.columns() {
        let nulls = column.null_count();
        let pct = percentage(nulls, rows);
        let pct_text = format!("{:.2}", pct);
        let pct_text = if pct == 0.0 {
            pct_text.green()
        } else if pct < 20.0 {
            pct_text.yellow()
        } else {
            pct_text.red()
        };
        println!(
            "  {:24} {:10} {:>8} {:>8}",
            name,
            column.dtype().to_string(),
            nulls,
            pct_text
        );
    }

    Ok(())
}
