//! Validation reporter: structural and quality summary of a pipeline run.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::{ColumnRoles, RecordSet, Value};
use crate::transform::CleaningLog;

/// Summary of one cleaning run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Rows in the raw extract.
    pub original_rows: usize,

    /// Rows in the cleaned record set.
    pub final_rows: usize,

    /// `original_rows - final_rows`.
    pub rows_removed: usize,

    /// Number of columns in the cleaned record set.
    pub columns: usize,

    /// Percentage of absent values per column, rounded to two decimals.
    pub missing_values_pct: IndexMap<String, f64>,

    /// Rows that repeat an earlier row exactly.
    pub duplicates: usize,

    /// Strictly negative values per counter column; zero counts are omitted.
    pub negative_values: IndexMap<String, usize>,

    /// Rows dropped for an absent geography field.
    #[serde(default)]
    pub dropped_missing_geography: usize,

    /// Rows kept with an absent period date.
    #[serde(default)]
    pub unparsed_periods: usize,
}

impl ValidationReport {
    /// True when no duplicates or negative counters were found.
    pub fn is_clean(&self) -> bool {
        self.duplicates == 0 && self.negative_values.is_empty()
    }
}

/// Build the report from the original row count and the final record set.
pub fn build_report(
    original_rows: usize,
    records: &RecordSet,
    roles: &ColumnRoles,
    log: &CleaningLog,
) -> ValidationReport {
    let final_rows = records.row_count();

    let missing_values_pct = records
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let missing = records.column_values(idx).filter(|v| v.is_null()).count();
            (column.clone(), percentage(missing, final_rows))
        })
        .collect();

    let mut seen: HashSet<&[Value]> = HashSet::with_capacity(final_rows);
    let duplicates = records
        .rows
        .iter()
        .filter(|row| !seen.insert(row.as_slice()))
        .count();

    let negative_values = records
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| roles.is_counter(column))
        .filter_map(|(idx, column)| {
            let negatives = records
                .column_values(idx)
                .filter(|v| v.as_f64().is_some_and(|n| n < 0.0))
                .count();
            (negatives > 0).then(|| (column.clone(), negatives))
        })
        .collect();

    ValidationReport {
        original_rows,
        final_rows,
        rows_removed: original_rows.saturating_sub(final_rows),
        columns: records.column_count(),
        missing_values_pct,
        duplicates,
        negative_values,
        dropped_missing_geography: log.dropped_missing_geography,
        unparsed_periods: log.unparsed_periods,
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original rows:   {}", self.original_rows)?;
        writeln!(f, "Final rows:      {}", self.final_rows)?;
        writeln!(f, "Rows removed:    {}", self.rows_removed)?;
        writeln!(f, "Columns:         {}", self.columns)?;
        writeln!(f, "Duplicates:      {}", self.duplicates)?;
        writeln!(f, "Unparsed periods: {}", self.unparsed_periods)?;
        for (column, count) in &self.negative_values {
            writeln!(f, "Negative values in {}: {}", column, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_fields() {
        let records = RecordSet::new(
            vec!["pays".into(), "deces_mat".into(), "smi_taux".into()],
            vec![
                vec!["Mali".into(), Value::Int(-1), Value::Null],
                vec!["Mali".into(), Value::Int(-1), Value::Null],
                vec!["Niger".into(), Value::Int(2), Value::Float(-3.0)],
            ],
        );
        let roles = ColumnRoles::classify(&records.columns);
        let mut log = CleaningLog::new();
        log.dropped_missing_geography = 1;

        let report = build_report(4, &records, &roles, &log);

        assert_eq!(report.final_rows, 3);
        assert_eq!(report.rows_removed, 1);
        assert_eq!(report.columns, 3);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.missing_values_pct["smi_taux"], 66.67);
        assert_eq!(report.missing_values_pct["pays"], 0.0);
        // ratio columns are not checked for negatives
        assert_eq!(report.negative_values.len(), 1);
        assert_eq!(report.negative_values["deces_mat"], 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_empty_report() {
        let records = RecordSet::new(vec!["pays".into()], vec![]);
        let roles = ColumnRoles::classify(&records.columns);

        let report = build_report(0, &records, &roles, &CleaningLog::new());

        assert_eq!(report.original_rows, 0);
        assert_eq!(report.final_rows, 0);
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.missing_values_pct["pays"], 0.0);
        assert!(report.is_clean());
    }
}
