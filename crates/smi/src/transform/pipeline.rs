//! The cleaning pipeline: schema normalization followed by a fixed chain of
//! role-driven stages.

use tracing::info;

use super::derived::DerivedMetrics;
use super::geography::GeographyNormalizer;
use super::log::CleaningLog;
use super::missing::MissingValueResolver;
use super::naming::normalize_names;
use super::period::PeriodParser;
use crate::input::RawTable;
use crate::schema::{ColumnRoles, RecordSet};
use crate::validation::{build_report, ValidationReport};

/// One transformation step.
///
/// A stage takes ownership of the record set and returns the transformed set.
/// Column roles come from the registry built after schema normalization.
pub trait Stage {
    /// Short name used in logs and the cleaning log.
    fn name(&self) -> &'static str;

    /// Transform the record set.
    fn apply(&self, records: RecordSet, roles: &ColumnRoles, log: &mut CleaningLog) -> RecordSet;
}

/// Canonicalizes column identifiers and builds the role registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaNormalizer;

impl SchemaNormalizer {
    pub fn apply(&self, records: RecordSet, log: &mut CleaningLog) -> (RecordSet, ColumnRoles) {
        let names = normalize_names(&records.columns);
        let renamed = records
            .columns
            .iter()
            .zip(&names)
            .filter(|(before, after)| before != after)
            .count();
        log.record("schema", None, renamed, "renamed columns");

        let roles = ColumnRoles::classify(&names);
        (records.with_columns(names), roles)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutput {
    /// The cleaned record set.
    pub records: RecordSet,
    /// Structural and quality report.
    pub report: ValidationReport,
    /// Column roles the stages worked from.
    pub roles: ColumnRoles,
    /// What each stage changed.
    pub log: CleaningLog,
}

/// Runs the five cleaning components in order.
pub struct CleaningPipeline {
    normalizer: SchemaNormalizer,
    stages: Vec<Box<dyn Stage>>,
}

impl CleaningPipeline {
    /// The standard chain: missing values, period, geography, derived metrics.
    ///
    /// The order matters: geography must be non-null before `geo_id` is built,
    /// and counters must be zero-filled before they are summed.
    pub fn new() -> Self {
        Self {
            normalizer: SchemaNormalizer,
            stages: vec![
                Box::new(MissingValueResolver),
                Box::new(PeriodParser),
                Box::new(GeographyNormalizer),
                Box::new(DerivedMetrics),
            ],
        }
    }

    /// Names of the role-driven stages, in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Clean a raw extract. The raw table is not modified.
    pub fn run(&self, raw: &RawTable) -> CleanOutput {
        self.run_records(RecordSet::from_raw(raw))
    }

    /// Clean an already-typed record set.
    pub fn run_records(&self, records: RecordSet) -> CleanOutput {
        let original_rows = records.row_count();
        info!(rows = original_rows, columns = records.column_count(), "cleaning started");

        let mut log = CleaningLog::new();
        let (mut records, roles) = self.normalizer.apply(records, &mut log);

        for stage in &self.stages {
            records = stage.apply(records, &roles, &mut log);
        }

        let report = build_report(original_rows, &records, &roles, &log);
        info!(
            original_rows = report.original_rows,
            final_rows = report.final_rows,
            rows_removed = report.rows_removed,
            duplicates = report.duplicates,
            "cleaning finished"
        );

        CleanOutput {
            records,
            report,
            roles,
            log,
        }
    }
}

impl Default for CleaningPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Value;

    #[test]
    fn test_stage_order() {
        assert_eq!(
            CleaningPipeline::new().stage_names(),
            vec!["missing_values", "period", "geography", "derived"]
        );
    }

    #[test]
    fn test_duplicate_headers_are_made_unique() {
        let raw = RawTable::new(
            vec!["Pays".into(), "Pays".into()],
            vec![vec!["mali".into(), "niger".into()]],
        );
        let out = CleaningPipeline::new().run(&raw);

        assert_eq!(out.records.columns, vec!["pays", "pays_1"]);
        assert_eq!(out.records.value(0, "pays"), Some(&Value::from("Mali")));
    }

    #[test]
    fn test_empty_input() {
        let raw = RawTable::new(vec!["Pays".into(), "Période".into()], vec![]);
        let out = CleaningPipeline::new().run(&raw);

        assert!(out.records.is_empty());
        assert_eq!(out.report.original_rows, 0);
        assert_eq!(out.report.final_rows, 0);
        assert_eq!(out.report.rows_removed, 0);
    }
}
