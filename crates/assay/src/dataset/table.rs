//! Column-oriented dataset.

use indexmap::IndexMap;

use crate::error::{AssayError, Result};

use super::column::Column;
use super::value::Value;

/// An ordered collection of named, equal-length columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: IndexMap<String, Column>,
}

impl Dataset {
    /// Create an empty dataset (no columns, no rows).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from named columns, checking that lengths agree.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut dataset = Self::new();
        for (name, column) in columns {
            dataset.insert_column(name, column)?;
        }
        Ok(dataset)
    }

    /// Build a dataset from row-major values. Column types are inferred.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); headers.len()];

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != headers.len() {
                return Err(AssayError::ShapeMismatch {
                    column: format!("row {}", row_idx),
                    expected: headers.len(),
                    found: row.len(),
                });
            }
            for (col_idx, value) in row.into_iter().enumerate() {
                columns[col_idx].push(value);
            }
        }

        Self::from_columns(
            headers
                .into_iter()
                .zip(columns)
                .map(|(name, values)| (name, Column::from_values(values))),
        )
    }

    /// Add a column, or replace an existing one with the same name.
    pub fn insert_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        let expected = self.row_count();
        let replacing_only = self.columns.len() == 1 && self.columns.contains_key(&name);
        if !self.columns.is_empty() && !replacing_only && column.len() != expected {
            return Err(AssayError::ShapeMismatch {
                column: name,
                expected,
                found: column.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Builder-style variant of [`Dataset::insert_column`].
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        self.insert_column(name, Column::from_values(values))?;
        Ok(self)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.values().next().map(Column::len).unwrap_or(0)
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Check whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Get a column by name for in-place edits that keep the row count.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// Iterate over `(name, column)` pairs in order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, col)| (name.as_str(), col))
    }

    /// Names from `names` that are not columns of this dataset, in input order.
    pub fn missing_columns<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        names
            .into_iter()
            .filter(|name| !self.has_column(name))
            .cloned()
            .collect()
    }

    /// Values of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.values().map(|col| &col.values()[index]).collect())
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count()).filter_map(move |i| self.row(i))
    }

    /// Keep only the rows whose mask entry is `true`.
    pub fn retain_rows(mut self, keep: &[bool]) -> Self {
        debug_assert_eq!(keep.len(), self.row_count());
        for column in self.columns.values_mut() {
            column.retain_rows(keep);
        }
        self
    }

    /// Remove the rows whose mask entry is `true`. Returns the dataset and the number removed.
    pub fn drop_rows(self, drop: &[bool]) -> (Self, usize) {
        let removed = drop.iter().filter(|&&d| d).count();
        if removed == 0 {
            return (self, 0);
        }
        let keep: Vec<bool> = drop.iter().map(|d| !d).collect();
        (self.retain_rows(&keep), removed)
    }
}
