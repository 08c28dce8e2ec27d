//! Record model: typed values, record sets and the column-role registry.

pub mod column;
mod table;
mod types;

pub use column::{ColumnRole, ColumnRoles, GeoField};
pub use table::RecordSet;
pub use types::Value;
