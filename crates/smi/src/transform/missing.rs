//! Missing-value resolver.
//!
//! Counter columns are zero-filled and coerced to integers. Rows with an
//! absent value in any present geography column are dropped. Everything
//! else is left as it is.

use tracing::{debug, warn};

use super::log::CleaningLog;
use super::pipeline::Stage;
use crate::schema::{ColumnRoles, RecordSet, Value};

/// Applies the per-role null policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingValueResolver;

impl MissingValueResolver {
    /// Counter policy: integers stay, floats round, anything else is zero.
    pub fn coerce_counter(value: &Value) -> Value {
        match value {
            Value::Int(i) => Value::Int(*i),
            other => Value::Int(other.as_i64().unwrap_or(0)),
        }
    }
}

impl Stage for MissingValueResolver {
    fn name(&self) -> &'static str {
        "missing_values"
    }

    fn apply(&self, records: RecordSet, roles: &ColumnRoles, log: &mut CleaningLog) -> RecordSet {
        let geo_indices: Vec<usize> = roles
            .geography_columns()
            .filter_map(|(_, column)| records.column_index(column))
            .collect();

        let (mut records, dropped) =
            records.retain_rows(|row| geo_indices.iter().all(|&i| !row[i].is_null()));
        if dropped > 0 {
            warn!(rows = dropped, "dropped rows with missing geography");
        }
        log.dropped_missing_geography += dropped;
        log.record(self.name(), None, dropped, "dropped rows with missing geography");

        for column in roles.counters() {
            let Some(idx) = records.column_index(column) else {
                continue;
            };

            let changed = records
                .column_values(idx)
                .filter(|v| **v != Self::coerce_counter(v))
                .count();
            records = records.map_column(idx, Self::coerce_counter);

            if changed > 0 {
                debug!(column = %column, values = changed, "coerced counter values");
            }
            log.record(self.name(), Some(column), changed, "filled or coerced counter values");
        }

        records
    }
}
