//! SMI: cleaning and star-schema loading for maternal and neonatal health
//! indicator extracts.
//!
//! Raw extracts move through three layers: bronze (raw, typed), silver
//! (cleaned and enriched) and a dimensional warehouse.
//!
//! # Core Principles
//!
//! - **Non-destructive**: the raw extract is never modified; each stage returns a new record set
//! - **Reported, not silent**: every dropped or coerced value is counted in the validation report
//! - **Idempotent loads**: re-synchronizing a batch never duplicates dimension or fact rows
//!
//! # Example
//!
//! ```no_run
//! use smi::Smi;
//!
//! let smi = Smi::new();
//! let summary = smi.run_file("smi_extract.csv", "manual-2025-01").unwrap();
//!
//! println!("Rows kept: {}", summary.report.final_rows);
//! if let Some(sync) = &summary.sync {
//!     println!("Facts inserted: {}", sync.facts_inserted);
//! }
//! ```

pub mod error;
pub mod input;
pub mod schema;
pub mod snapshot;
pub mod transform;
pub mod validation;
pub mod warehouse;

mod smi;

pub use crate::smi::{Extraction, RunSummary, Smi, SmiConfig};
pub use error::{Result, SmiError};
pub use input::{ExtractionMetrics, InMemoryMetrics, NoopMetrics, RawTable, SourceMetadata};
pub use schema::{ColumnRole, ColumnRoles, GeoField, RecordSet, Value};
pub use transform::{CleanOutput, CleaningLog, CleaningPipeline};
pub use validation::ValidationReport;
pub use warehouse::{CleanedRecord, SqliteWarehouse, SyncSummary, WarehouseStore};
