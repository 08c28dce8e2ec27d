//! Main `Smi` struct: the medallion stages wired together.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::input::{
    ExtractionMetrics, NoopMetrics, Parser, ParserConfig, RawTable, SourceMetadata, EXPECTED_HEADERS,
};
use crate::schema::column::GEO_ID;
use crate::schema::RecordSet;
use crate::snapshot::{self, Layer, Snapshot};
use crate::transform::{CleanOutput, CleaningPipeline};
use crate::validation::ValidationReport;
use crate::warehouse::{synchronize, CleanedRecord, SqliteWarehouse, SyncSummary};

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct SmiConfig {
    /// Extract reader configuration.
    pub parser: ParserConfig,
    /// Directory holding the `bronze/` and `silver/` layers.
    pub data_root: PathBuf,
    /// SQLite warehouse file.
    pub warehouse: PathBuf,
}

impl Default for SmiConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            data_root: PathBuf::from("data"),
            warehouse: PathBuf::from("data/warehouse.db"),
        }
    }
}

impl SmiConfig {
    pub fn bronze_path(&self) -> PathBuf {
        self.data_root.join("bronze").join("smi_raw.json")
    }

    pub fn silver_path(&self) -> PathBuf {
        self.data_root.join("silver").join("smi_cleaned.json")
    }

    pub fn report_path(&self) -> PathBuf {
        self.data_root.join("silver").join("validation_report.json")
    }
}

/// Result of the extraction stage.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub raw: RawTable,
    pub source: SourceMetadata,
}

/// Everything one end-to-end run produced, for the completion notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub source: SourceMetadata,
    pub report: ValidationReport,
    /// Absent when the cleaned records lack the geography needed to sync.
    pub sync: Option<SyncSummary>,
}

/// Drives extraction, cleaning and synchronization.
pub struct Smi {
    config: SmiConfig,
    parser: Parser,
    pipeline: CleaningPipeline,
}

impl Smi {
    /// Create an instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(SmiConfig::default())
    }

    pub fn with_config(config: SmiConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self {
            config,
            parser,
            pipeline: CleaningPipeline::new(),
        }
    }

    pub fn config(&self) -> &SmiConfig {
        &self.config
    }

    /// Read an extract file, reporting to `metrics`.
    pub fn extract(&self, path: impl AsRef<Path>, metrics: &dyn ExtractionMetrics) -> Result<Extraction> {
        let (raw, source) = self.parser.parse_file_with_metrics(path, metrics)?;

        let check = raw.check_columns(EXPECTED_HEADERS);
        if !check.missing.is_empty() {
            warn!(missing = ?check.missing, "extract lacks expected columns");
        }
        if !check.unexpected.is_empty() {
            info!(extra = check.unexpected.len(), "extract has additional columns");
        }

        Ok(Extraction { raw, source })
    }

    /// Extract and save the bronze snapshot.
    pub fn extract_to_bronze(
        &self,
        path: impl AsRef<Path>,
        metrics: &dyn ExtractionMetrics,
    ) -> Result<Extraction> {
        let extraction = self.extract(path, metrics)?;
        let snapshot = Snapshot::new(
            Layer::Bronze,
            RecordSet::from_raw(&extraction.raw),
            Some(extraction.source.clone()),
        );
        snapshot.save(self.config.bronze_path())?;
        info!(path = %self.config.bronze_path().display(), "bronze snapshot saved");
        Ok(extraction)
    }

    /// Run the cleaning pipeline. Never fails on data-quality issues.
    pub fn clean(&self, records: RecordSet) -> CleanOutput {
        self.pipeline.run_records(records)
    }

    /// Clean the bronze snapshot at `input` and save the silver layer.
    pub fn clean_bronze(&self, input: impl AsRef<Path>) -> Result<CleanOutput> {
        let bronze = Snapshot::load(input)?;
        let output = self.clean(bronze.records);
        self.save_silver(&output, bronze.source)?;
        Ok(output)
    }

    fn save_silver(&self, output: &CleanOutput, source: Option<SourceMetadata>) -> Result<()> {
        Snapshot::new(Layer::Silver, output.records.clone(), source).save(self.config.silver_path())?;
        snapshot::save_json(&output.report, self.config.report_path())?;
        info!(path = %self.config.silver_path().display(), "silver snapshot saved");
        Ok(())
    }

    /// Open the configured warehouse.
    pub fn open_warehouse(&self) -> Result<SqliteWarehouse> {
        SqliteWarehouse::open(&self.config.warehouse)
    }

    /// Synchronize a cleaned record set into the warehouse.
    pub fn synchronize(&self, records: &RecordSet, batch_id: &str) -> Result<SyncSummary> {
        let cleaned = CleanedRecord::from_record_set(records)?;
        let store = self.open_warehouse()?;
        synchronize(&store, &cleaned, batch_id)
    }

    /// Synchronize the saved silver snapshot.
    pub fn synchronize_silver(&self, batch_id: &str) -> Result<SyncSummary> {
        let silver = Snapshot::load(self.config.silver_path())?;
        self.synchronize(&silver.records, batch_id)
    }

    /// Load the saved validation report.
    pub fn load_report(&self) -> Result<ValidationReport> {
        snapshot::load_json(self.config.report_path())
    }

    /// Extract, clean and synchronize one file end to end.
    ///
    /// Synchronization is skipped, with a warning, when the extract has no
    /// complete geography to key the dimension on.
    pub fn run(
        &self,
        path: impl AsRef<Path>,
        batch_id: &str,
        metrics: &dyn ExtractionMetrics,
    ) -> Result<RunSummary> {
        let extraction = self.extract_to_bronze(path, metrics)?;
        let output = self.pipeline.run(&extraction.raw);
        self.save_silver(&output, Some(extraction.source.clone()))?;

        let sync = if output.roles.has_full_geography() && output.records.has_column(GEO_ID) {
            Some(self.synchronize(&output.records, batch_id)?)
        } else {
            warn!(batch_id, "cleaned records lack geography columns, skipping synchronization");
            None
        };

        Ok(RunSummary {
            source: extraction.source,
            report: output.report,
            sync,
        })
    }

    /// [`Smi::run`] without metrics.
    pub fn run_file(&self, path: impl AsRef<Path>, batch_id: &str) -> Result<RunSummary> {
        self.run(path, batch_id, &NoopMetrics)
    }
}

impl Default for Smi {
    fn default() -> Self {
        Self::new()
    }
}
