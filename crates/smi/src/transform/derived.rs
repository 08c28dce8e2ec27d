//! Derived-metrics calculator.

use tracing::debug;

use super::log::CleaningLog;
use super::pipeline::Stage;
use crate::schema::column::{MATERNAL_TOTAL, NEONATAL_TOTAL};
use crate::schema::{ColumnRoles, RecordSet, Value};

/// Adds totals over indicator families whose constituents exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedMetrics;

impl DerivedMetrics {
    /// Row-wise sum over the given columns; absent cells count as zero.
    /// Sums saturate at the `i64` bounds.
    fn row_sums(records: &RecordSet, columns: &[&str]) -> Vec<Value> {
        let indices: Vec<usize> = columns
            .iter()
            .filter_map(|c| records.column_index(c))
            .collect();
        records
            .rows
            .iter()
            .map(|row| {
                let total = indices
                    .iter()
                    .map(|&i| row[i].as_i64().unwrap_or(0))
                    .fold(0i64, i64::saturating_add);
                Value::Int(total)
            })
            .collect()
    }
}

impl Stage for DerivedMetrics {
    fn name(&self) -> &'static str {
        "derived"
    }

    fn apply(&self, mut records: RecordSet, roles: &ColumnRoles, log: &mut CleaningLog) -> RecordSet {
        let causes: Vec<&str> = roles.maternal_causes().iter().map(String::as_str).collect();
        if !causes.is_empty() {
            debug!(constituents = causes.len(), column = MATERNAL_TOTAL, "computing total");
            let totals = Self::row_sums(&records, &causes);
            log.record(self.name(), Some(MATERNAL_TOTAL), totals.len(), "summed maternal causes");
            records = records.with_column(MATERNAL_TOTAL, totals);
        }

        if let Some((early, late)) = roles.neonatal_parts() {
            debug!(column = NEONATAL_TOTAL, "computing total");
            let totals = Self::row_sums(&records, &[early, late]);
            log.record(self.name(), Some(NEONATAL_TOTAL), totals.len(), "summed neonatal bands");
            records = records.with_column(NEONATAL_TOTAL, totals);
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let records = RecordSet::new(
            vec![
                "deces_mat".into(),
                "deces_mat_hemorragie".into(),
                "deces_mat_eclampsie".into(),
                "deces_neo_0_6_jours".into(),
                "deces_neo_7_28_jours".into(),
            ],
            vec![vec![
                Value::Int(9),
                Value::Int(2),
                Value::Int(1),
                Value::Int(2),
                Value::Int(1),
            ]],
        );
        let roles = ColumnRoles::classify(&records.columns);

        let out = DerivedMetrics.apply(records, &roles, &mut CleaningLog::new());

        // the pre-existing grand total is not part of the sum
        assert_eq!(out.value(0, MATERNAL_TOTAL), Some(&Value::Int(3)));
        assert_eq!(out.value(0, NEONATAL_TOTAL), Some(&Value::Int(3)));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let raw = crate::input::RawTable::new(
            vec!["deces_neo_0_6_jours".into(), "deces_neo_7_28_jours".into()],
            vec![vec![i64::MAX.to_string(), "1".into()]],
        );
        let records = RecordSet::from_raw(&raw);
        let roles = ColumnRoles::classify(&records.columns);

        let out = DerivedMetrics.apply(records, &roles, &mut CleaningLog::new());

        assert_eq!(out.value(0, NEONATAL_TOTAL), Some(&Value::Int(i64::MAX)));
    }

    #[test]
    fn test_out_of_range_float_counts_as_zero() {
        let records = RecordSet::new(
            vec!["deces_neo_0_6_jours".into(), "deces_neo_7_28_jours".into()],
            vec![vec![Value::Float(1e30), Value::Int(2)]],
        );
        let roles = ColumnRoles::classify(&records.columns);

        let out = DerivedMetrics.apply(records, &roles, &mut CleaningLog::new());

        assert_eq!(Value::Float(1e30).as_i64(), None);
        assert_eq!(Value::Float(-1e30).as_i64(), None);
        assert_eq!(out.value(0, NEONATAL_TOTAL), Some(&Value::Int(2)));
    }

    #[test]
    fn test_no_constituents_no_column() {
        let records = RecordSet::new(
            vec!["deces_neo_0_6_jours".into()],
            vec![vec![Value::Int(1)]],
        );
        let roles = ColumnRoles::classify(&records.columns);

        let out = DerivedMetrics.apply(records, &roles, &mut CleaningLog::new());

        assert!(!out.has_column(NEONATAL_TOTAL));
        assert!(!out.has_column(MATERNAL_TOTAL));
    }
}
