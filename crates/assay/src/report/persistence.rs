//! Persistence for quality reports - save/load JSON files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{AssayError, Result};

use super::QualityReport;

impl QualityReport {
    /// Save the report as pretty JSON.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use assay::report::QualityReport;
    /// # fn example(report: &QualityReport) -> assay::Result<()> {
    /// report.save("users.quality.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    AssayError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            AssayError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| {
            AssayError::Persistence(format!("Failed to serialize quality report: {}", e))
        })?;

        Ok(())
    }

    /// Load a previously saved report.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            AssayError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            AssayError::Persistence(format!(
                "Failed to parse quality report '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
