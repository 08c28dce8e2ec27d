//! CLI command implementations.

pub mod clean;
pub mod extract;
pub mod report;
pub mod run;
pub mod sync;

/// Default batch identifier: a timestamp-based run id.
pub fn default_batch_id() -> String {
    format!("manual__{}", chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S"))
}
