//! Raw extract representation and source metadata.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the extracted source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the extraction was performed.
    pub extracted_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been extracted.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            extracted_at: Utc::now(),
        }
    }
}

/// Headers a well-formed extract carries.
pub const EXPECTED_HEADERS: &[&str] = &[
    "Pays",
    "Région",
    "Province",
    "District sanitaire",
    "Commune/arrondissement",
    "Formation sanitaire",
    "Période",
];

/// Outcome of comparing extract headers against an expected header list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCheck {
    /// Expected headers absent from the extract.
    pub missing: Vec<String>,
    /// Extract headers nobody asked for.
    pub unexpected: Vec<String>,
}

impl ColumnCheck {
    /// True when every expected header is present.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// A raw extract: free-text headers and untyped string cells.
///
/// Headers are not guaranteed to be unique. The cleaning pipeline never
/// mutates a `RawTable`; it works on its own typed copy.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Column headers, as found in the extract.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a new raw table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Compare the headers against the ones a well-formed extract carries.
    pub fn check_columns(&self, expected: &[&str]) -> ColumnCheck {
        let actual: HashSet<&str> = self.headers.iter().map(|h| h.trim()).collect();
        let wanted: HashSet<&str> = expected.iter().copied().collect();

        let missing = expected
            .iter()
            .filter(|e| !actual.contains(*e))
            .map(|e| e.to_string())
            .collect();
        let unexpected = self
            .headers
            .iter()
            .filter(|h| !wanted.contains(h.trim()))
            .cloned()
            .collect();

        ColumnCheck {
            missing,
            unexpected,
        }
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}
