//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Assay: configuration-driven data quality pipeline
#[derive(Parser)]
#[command(name = "assay")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Explicit log filter (e.g. "debug", "assay=trace"); overrides -v/-q
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Also write JSON-formatted logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate and clean a data file against a configuration
    Validate {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "DATA")]
        file: PathBuf,

        /// Path to the JSON validation configuration
        #[arg(short, long, value_name = "CONFIG")]
        config: PathBuf,

        /// Output path for cleaned data (default: <stem>_cleaned.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: same as input)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Output path for the quality report (default: <stem>.quality.json)
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Fail if the configuration contains keys no stage handles
        #[arg(long)]
        strict: bool,
    },

    /// Parse a configuration and show which stages would run
    Check {
        /// Path to the JSON validation configuration
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show columns, inferred types and null counts of a data file
    Inspect {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "DATA")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    /// Format matching a detected input format name.
    pub fn for_source(format: &str) -> Self {
        match format {
            "tsv" => OutputFormat::Tsv,
            _ => OutputFormat::Csv,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv, tsv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
