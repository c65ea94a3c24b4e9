//! CSV/TSV parser with delimiter detection and column type inference.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::source::{SourceMetadata, format_for_delimiter, is_null_value};
use crate::dataset::{Column, ColumnType, Dataset, Value};
use crate::error::{AssayError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Infer integer/float/boolean columns (otherwise every column is text).
    pub infer_types: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            infer_types: true,
        }
    }
}

/// Parses tabular data files into a [`Dataset`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let io_err = |e| AssayError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let size_bytes = file.metadata().map_err(io_err)?.len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(io_err)?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let dataset = self.parse_bytes(&contents, delimiter)?;

        let source_metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format_for_delimiter(delimiter).to_string(),
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, source_metadata))
    }

    /// Parse in-memory text, detecting the delimiter unless one is configured.
    pub fn parse_str(&self, text: &str) -> Result<Dataset> {
        let bytes = text.as_bytes();
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        self.parse_bytes(bytes, delimiter)
    }

    /// Parse bytes with a known delimiter.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();

        let first = match records.next() {
            Some(record) => record?,
            None => return Err(AssayError::EmptyData("No header row found".to_string())),
        };

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        let headers: Vec<String> = if self.config.has_header {
            dedupe_headers(first.iter().map(|s| s.trim().to_string()).collect())
        } else {
            raw_rows.push(first.iter().map(|s| s.to_string()).collect());
            (0..first.len()).map(|i| format!("column_{}", i + 1)).collect()
        };

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(AssayError::EmptyData("No columns found".to_string()));
        }

        let expected_cols = headers.len();
        for result in records {
            if let Some(max) = self.config.max_rows {
                if raw_rows.len() >= max {
                    break;
                }
            }

            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();

            // Pad or truncate ragged rows
            row.resize(expected_cols, String::new());
            raw_rows.push(row);
        }

        let columns = headers.into_iter().enumerate().map(|(col_idx, name)| {
            let cells: Vec<&str> = raw_rows.iter().map(|row| row[col_idx].as_str()).collect();
            (name, self.build_column(&cells))
        });

        Dataset::from_columns(columns)
    }

    /// Turn raw text cells into a typed column.
    fn build_column(&self, cells: &[&str]) -> Column {
        let dtype = if self.config.infer_types {
            infer_column_type(cells)
        } else {
            ColumnType::String
        };

        let values = cells
            .iter()
            .map(|cell| {
                if is_null_value(cell) {
                    return Value::Null;
                }
                let text = Value::Str(cell.trim().to_string());
                text.cast(dtype).unwrap_or(text)
            })
            .collect();

        Column::new(dtype, values)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Suffix repeated header names (`id`, `id.1`, `id.2`) so every column is addressable.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
    headers
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut suffix = 1;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{}.{}", name, suffix);
                suffix += 1;
            }
            candidate
        })
        .collect()
}

/// Infer the narrowest type that every non-null cell parses as.
fn infer_column_type(cells: &[&str]) -> ColumnType {
    let mut non_null = cells.iter().map(|c| c.trim()).filter(|c| !is_null_value(c)).peekable();
    if non_null.peek().is_none() {
        return ColumnType::Unknown;
    }

    let values: Vec<&str> = non_null.collect();
    if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        ColumnType::Integer
    } else if values
        .iter()
        .all(|v| v.parse::<f64>().map(|f| f.is_finite()).unwrap_or(false))
    {
        ColumnType::Float
    } else if values
        .iter()
        .all(|v| v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false"))
    {
        ColumnType::Boolean
    } else {
        ColumnType::String
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(AssayError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab gets a slight bonus
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_parse_csv_infers_types() {
        let parser = Parser::new();
        let data = b"name,age,score,active\nAlice,30,1.5,true\nBob,NA,2,false";
        let dataset = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(dataset.column_names(), vec!["name", "age", "score", "active"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.column("name").unwrap().dtype(), ColumnType::String);
        assert_eq!(dataset.column("age").unwrap().dtype(), ColumnType::Integer);
        assert_eq!(dataset.column("score").unwrap().dtype(), ColumnType::Float);
        assert_eq!(dataset.column("active").unwrap().dtype(), ColumnType::Boolean);
        assert_eq!(dataset.column("age").unwrap().values()[1], Value::Null);
        assert_eq!(dataset.column("score").unwrap().values()[1], Value::Float(2.0));
    }

    #[test]
    fn test_parse_header_only_is_empty_dataset() {
        let parser = Parser::new();
        let dataset = parser.parse_bytes(b"id,name\n", b',').unwrap();
        assert_eq!(dataset.column_count(), 2);
        assert_eq!(dataset.row_count(), 0);
    }

    #[test]
    fn test_parse_empty_input_fails() {
        let parser = Parser::new();
        assert!(matches!(
            parser.parse_bytes(b"", b','),
            Err(AssayError::EmptyData(_))
        ));
    }

    #[test]
    fn test_parse_ragged_rows() {
        let parser = Parser::new();
        let dataset = parser.parse_bytes(b"a,b,c\n1,2\n3,4,5,6\n", b',').unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert!(dataset.column("c").unwrap().values()[0].is_null());
        assert_eq!(dataset.column("c").unwrap().values()[1], Value::Int(5));
    }

    #[test]
    fn test_parse_without_header() {
        let parser = Parser::with_config(ParserConfig {
            has_header: false,
            ..ParserConfig::default()
        });
        let dataset = parser.parse_bytes(b"1,x\n2,y\n", b',').unwrap();
        assert_eq!(dataset.column_names(), vec!["column_1", "column_2"]);
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_duplicate_headers_are_suffixed() {
        let parser = Parser::new();
        let dataset = parser.parse_bytes(b"id,id,name\n1,2,x\n", b',').unwrap();
        assert_eq!(dataset.column_names(), vec!["id", "id.1", "name"]);
    }

    #[test]
    fn test_max_rows() {
        let parser = Parser::with_config(ParserConfig {
            max_rows: Some(1),
            ..ParserConfig::default()
        });
        let dataset = parser.parse_str("a\n1\n2\n3\n").unwrap();
        assert_eq!(dataset.row_count(), 1);
    }
}
