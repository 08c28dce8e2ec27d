//! Typed in-memory record set.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::Value;
use crate::error::{Result, SmiError};
use crate::input::RawTable;

/// An ordered set of columns and typed rows.
///
/// Pipeline stages take a `RecordSet` by value and hand back a new one; no
/// stage keeps a reference to a record set it has returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Column identifiers, in order.
    pub columns: Vec<String>,
    /// Row data (row-major order), each row as wide as `columns`.
    pub rows: Vec<Vec<Value>>,
}

impl RecordSet {
    /// Create a record set. Rows are padded or truncated to the column count.
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, Value::Null);
        }
        Self { columns, rows }
    }

    /// Working copy of a raw extract, with cell types inferred.
    pub fn from_raw(raw: &RawTable) -> Self {
        let rows = raw
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| Value::infer(cell)).collect())
            .collect();
        Self::new(raw.headers.clone(), rows)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get a cell by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.get(row, col)
    }

    /// All values of a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(&Value::Null))
    }

    /// Replace the column identifiers, keeping the rows.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        debug_assert_eq!(columns.len(), self.columns.len());
        self.columns = columns;
        self
    }

    /// Replace a column's values, or append the column if it does not exist.
    pub fn with_column(mut self, name: &str, values: Vec<Value>) -> Self {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        self
    }

    /// Apply `f` to every value of the column at `index`.
    pub fn map_column(mut self, index: usize, f: impl Fn(&Value) -> Value) -> Self {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
        self
    }

    /// Keep rows for which `keep` is true; returns the new set and the number dropped.
    pub fn retain_rows(mut self, keep: impl Fn(&[Value]) -> bool) -> (Self, usize) {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        let dropped = before - self.rows.len();
        (self, dropped)
    }

    /// Write the record set as delimited text with a header row.
    pub fn write_csv(&self, path: impl AsRef<Path>, delimiter: u8) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| SmiError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush().map_err(|e| SmiError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }
}
