//! Writing cleaned datasets back to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;

use crate::dataset::{Dataset, Value};
use crate::error::{AssayError, Result};

/// Write a dataset as delimited text (nulls become empty cells).
pub fn write_delimited(dataset: &Dataset, path: impl AsRef<Path>, delimiter: u8) -> Result<()> {
    let file = create_file(path.as_ref())?;
    write_delimited_to(dataset, BufWriter::new(file), delimiter)
}

/// Write a dataset as delimited text to any writer.
pub fn write_delimited_to<W: Write>(dataset: &Dataset, writer: W, delimiter: u8) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer.write_record(dataset.column_names())?;
    for row in dataset.rows() {
        csv_writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    csv_writer.flush().map_err(|e| AssayError::Persistence(e.to_string()))?;
    Ok(())
}

/// Write a dataset as a JSON array of row objects.
pub fn write_json(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let file = create_file(path.as_ref())?;
    serde_json::to_writer_pretty(BufWriter::new(file), &to_records(dataset))?;
    Ok(())
}

/// Row objects keyed by column name, in column order.
pub fn to_records(dataset: &Dataset) -> Vec<IndexMap<&str, &Value>> {
    let names = dataset.column_names();
    dataset
        .rows()
        .map(|row| names.iter().copied().zip(row).collect())
        .collect()
}

fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| AssayError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    File::create(path).map_err(|e| AssayError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
