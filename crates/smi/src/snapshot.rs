//! Layer snapshots: record sets and reports saved as JSON between stages.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SmiError};
use crate::input::SourceMetadata;
use crate::schema::RecordSet;

/// Medallion layer a snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Raw extract, typed but otherwise untouched.
    Bronze,
    /// Cleaned and enriched.
    Silver,
}

/// A record set plus the lineage needed to read it back later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub layer: Layer,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    pub records: RecordSet,
}

impl Snapshot {
    pub fn new(layer: Layer, records: RecordSet, source: Option<SourceMetadata>) -> Self {
        Self {
            layer,
            created_at: Utc::now(),
            source,
            records,
        }
    }

    /// Save the snapshot to a JSON file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use smi::snapshot::{Layer, Snapshot};
    /// # use smi::RecordSet;
    /// # fn example(records: RecordSet) -> smi::Result<()> {
    /// Snapshot::new(Layer::Silver, records, None).save("data/silver/smi_cleaned.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path)
    }
}

/// Write any serializable value as pretty JSON, creating parent directories.
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                SmiError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(path).map_err(|e| {
        SmiError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
    })?;

    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).map_err(|e| {
        SmiError::Persistence(format!("Failed to write '{}': {}", path.display(), e))
    })?;

    Ok(())
}

/// Read a JSON file written by [`save_json`].
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| {
        SmiError::Persistence(format!("Failed to open file '{}': {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| {
        SmiError::Persistence(format!("Failed to parse '{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Value;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_keeps_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silver/smi_cleaned.json");

        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let records = RecordSet::new(
            vec!["periode_date".into(), "deces_mat".into(), "smi_taux".into()],
            vec![vec![Value::Date(date), Value::Int(3), Value::Float(3.0)]],
        );
        Snapshot::new(Layer::Silver, records.clone(), None)
            .save(&path)
            .unwrap();

        let loaded = Snapshot::load(&path).unwrap();
        assert_eq!(loaded.layer, Layer::Silver);
        assert_eq!(loaded.records, records);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Snapshot::load("/nonexistent/bronze.json");
        assert!(matches!(result, Err(SmiError::Persistence(_))));
    }
}
