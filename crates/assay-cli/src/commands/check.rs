//! Check command - parse a configuration and list the stages it enables.

use std::path::PathBuf;

use assay::config::BUILTIN_STAGES;
use assay::{Pipeline, ValidationConfig};
use colored::Colorize;

pub fn run(
    config_path: PathBuf,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !config_path.exists() {
        return Err(format!("Config file not found: {}", config_path.display()).into());
    }

    let config = ValidationConfig::from_json_file(&config_path)?;
    let pipeline = Pipeline::new();
    let enabled = config.enabled_stages();
    let ignored = pipeline.unhandled_keys(&config);

    if json_output {
        let status = serde_json::json!({
            "config": config_path.display().to_string(),
            "stages": enabled,
            "ignored_keys": ignored,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Configuration".cyan().bold(),
        config_path.display().to_string().white()
    );
    println!();

    println!("{}", "Stages:".yellow().bold());
    for stage in BUILTIN_STAGES {
        if enabled.contains(&stage) {
            println!("  {} {}", "run ".green(), stage);
        } else if verbose {
            println!("  {} {}", "skip".dimmed(), stage.dimmed());
        }
    }
    if enabled.is_empty() {
        println!("  {}", "none - the pipeline would pass data through unchanged".dimmed());
    }

    if !ignored.is_empty() {
        println!();
        println!("{}", "Ignored keys:".yellow().bold());
        for key in &ignored {
            println!("  {}", key.yellow());
        }
    }

    if verbose {
        println!();
        println!("{}", "Normalised configuration:".yellow().bold());
        println!("{}", config.to_json_pretty()?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_check_accepts_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"null_handling": {{"age": "fill_mean"}}, "action_log": true}}"#
        )
        .unwrap();

        run(file.path().to_path_buf(), false, true).unwrap();
        run(file.path().to_path_buf(), true, false).unwrap();
    }

    #[test]
    fn test_check_rejects_invalid_strategy() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"null_handling": {{"age": "fill_magic"}}}}"#).unwrap();

        assert!(run(file.path().to_path_buf(), false, false).is_err());
    }
}
