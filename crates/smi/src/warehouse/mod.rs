//! Star-schema warehouse: typed cleaned records, conformed dimensions and
//! idempotent fact upserts.

pub mod calendar;
pub mod facts;
mod record;
mod store;
mod sync;

pub use calendar::{date_key, DateRow};
pub use facts::{FactTableSpec, MeasureKind, MeasureSpec, MeasureValue, FACT_TABLES};
pub use record::{CleanedRecord, Geography, Period};
pub use store::{FactWrite, SqliteWarehouse, WarehouseStore};
pub use sync::{sync_dimensions, sync_facts, synchronize, synchronize_at, SyncSummary};
