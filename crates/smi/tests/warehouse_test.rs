//! Integration tests for dimension and fact synchronization.

use std::io::Write;

use chrono::NaiveDate;
use tempfile::{tempdir, NamedTempFile};

use smi::warehouse::{synchronize_at, CleanedRecord, SqliteWarehouse};
use smi::{CleaningPipeline, RawTable, Smi, SmiConfig, SmiError};

const EXTRACT: &str = "Pays;Région;Province;District sanitaire;Commune;Formation sanitaire;Période;\
Nouveau-nes decedes de 0-6 jours;Nouveau-nes decedes de 7-28 jours
Burkina Faso;Nando;Sissili;DS Léo;Boura;BHM Boura;Janvier 2025;2;1
Burkina Faso;Nando;Sissili;DS Léo;Boura;BHM Boura;Février 2025;0;1
Burkina Faso;Nando;Sissili;DS Léo;Léo;CMA Léo;Janvier 2025;3;0
Burkina Faso;Nando;Sissili;DS Léo;Léo;CMA Léo;sans date;1;1
";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn cleaned_records(content: &str) -> Vec<CleanedRecord> {
    let file = create_test_file(content);
    let (raw, _) = smi::input::Parser::new().parse_file(file.path()).unwrap();
    let out = CleaningPipeline::new().run(&raw);
    CleanedRecord::from_record_set(&out.records).unwrap()
}

#[test]
fn test_first_sync_counts() {
    let store = SqliteWarehouse::open_in_memory().unwrap();
    let records = cleaned_records(EXTRACT);

    let summary = synchronize_at(&store, &records, "run-1", today()).unwrap();

    assert_eq!(summary.geographies_inserted, 2);
    assert_eq!(summary.dates_inserted, 2);
    assert_eq!(summary.facts_inserted, 3);
    assert_eq!(summary.facts_updated, 0);
    assert_eq!(summary.skipped_without_period, 1);

    assert_eq!(store.row_count("dim_geography").unwrap(), 2);
    assert_eq!(store.row_count("dim_date").unwrap(), 2);
    assert_eq!(store.row_count("fact_neonatal_deaths").unwrap(), 3);
    assert_eq!(store.row_count("fact_maternal_deaths").unwrap(), 0);
}

#[test]
fn test_resync_is_idempotent() {
    let store = SqliteWarehouse::open_in_memory().unwrap();
    let records = cleaned_records(EXTRACT);

    synchronize_at(&store, &records, "run-1", today()).unwrap();
    let snapshot = |store: &SqliteWarehouse| -> Vec<(i64, i64, i64, i64, i64)> {
        let mut stmt = store
            .connection()
            .prepare(
                "SELECT geo_key, date_key, deces_0_6_jours, deces_7_28_jours, total_deces
                 FROM fact_neonatal_deaths ORDER BY geo_key, date_key",
            )
            .unwrap();
        stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    };
    let first = snapshot(&store);

    let summary = synchronize_at(&store, &records, "run-2", today()).unwrap();
    let second = snapshot(&store);

    assert_eq!(summary.geographies_inserted, 0);
    assert_eq!(summary.dates_inserted, 0);
    assert_eq!(summary.facts_inserted, 0);
    assert_eq!(summary.facts_updated, 3);
    assert_eq!(first, second);
    assert_eq!(store.row_count("dim_geography").unwrap(), 2);
    assert_eq!(store.row_count("fact_neonatal_deaths").unwrap(), 3);

    let batches: i64 = store
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM fact_neonatal_deaths WHERE batch_id = 'run-2'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(batches, 3);
}

#[test]
fn test_later_extract_replaces_measures() {
    let store = SqliteWarehouse::open_in_memory().unwrap();
    synchronize_at(&store, &cleaned_records(EXTRACT), "run-1", today()).unwrap();

    let corrected = "Pays;Région;Province;District sanitaire;Commune;Formation sanitaire;Période;\
Nouveau-nes decedes de 0-6 jours;Nouveau-nes decedes de 7-28 jours
Burkina Faso;Nando;Sissili;DS Léo;Boura;BHM Boura;Janvier 2025;5;1
";
    let summary = synchronize_at(&store, &cleaned_records(corrected), "run-2", today()).unwrap();

    assert_eq!(summary.facts_updated, 1);
    let total: i64 = store
        .connection()
        .query_row(
            "SELECT f.total_deces FROM fact_neonatal_deaths f
             JOIN dim_geography g ON g.geo_key = f.geo_key
             WHERE g.geo_id = 'burkina_faso_nando_sissili_ds_leo_boura_bhm_boura'
               AND f.date_key = 20250101",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(total, 6);
}

#[test]
fn test_existing_geography_is_not_overwritten() {
    let store = SqliteWarehouse::open_in_memory().unwrap();
    let mut records = cleaned_records(EXTRACT);
    synchronize_at(&store, &records, "run-1", today()).unwrap();

    // same natural key, corrected attribute
    records[0].geography.province = "Ziro".to_string();
    let later = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    synchronize_at(&store, &records, "run-2", later).unwrap();

    let (province, effective): (String, NaiveDate) = store
        .connection()
        .query_row(
            "SELECT province, effective_date FROM dim_geography
             WHERE geo_id = 'burkina_faso_nando_sissili_ds_leo_boura_bhm_boura' AND is_current = 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(province, "Sissili");
    assert_eq!(effective, today());
}

#[test]
fn test_projection_requires_geo_id() {
    let raw = RawTable::new(
        vec!["Pays".into(), "Période".into()],
        vec![vec!["Mali".into(), "Mars 2025".into()]],
    );
    let out = CleaningPipeline::new().run(&raw);

    let result = CleanedRecord::from_record_set(&out.records);
    assert!(matches!(result, Err(SmiError::MissingColumn(_))));
}

#[test]
fn test_end_to_end_run() {
    let dir = tempdir().unwrap();
    let file = create_test_file(EXTRACT);
    let config = SmiConfig {
        data_root: dir.path().join("data"),
        warehouse: dir.path().join("data/warehouse.db"),
        ..SmiConfig::default()
    };
    let smi = Smi::with_config(config);

    let summary = smi.run_file(file.path(), "run-1").unwrap();

    assert_eq!(summary.source.row_count, 4);
    assert_eq!(summary.report.final_rows, 4);
    assert_eq!(summary.sync.as_ref().unwrap().facts_inserted, 3);
    assert!(smi.config().bronze_path().exists());
    assert!(smi.config().silver_path().exists());

    let report = smi.load_report().unwrap();
    assert_eq!(report, summary.report);

    let again = smi.synchronize_silver("run-2").unwrap();
    assert_eq!(again.facts_inserted, 0);
    assert_eq!(again.facts_updated, 3);
}

#[test]
fn test_repeated_key_in_one_batch_keeps_last() {
    let store = SqliteWarehouse::open_in_memory().unwrap();
    let content = "Pays;Région;Province;District sanitaire;Commune;Formation sanitaire;Période;\
Nouveau-nes decedes de 0-6 jours;Nouveau-nes decedes de 7-28 jours
Burkina Faso;Nando;Sissili;DS Léo;Boura;BHM Boura;Janvier 2025;2;1
Burkina Faso;Nando;Sissili;DS Léo;Boura;BHM Boura;Janvier 2025;4;1
";

    let summary = synchronize_at(&store, &cleaned_records(content), "run-1", today()).unwrap();

    assert_eq!(summary.facts_inserted, 1);
    assert_eq!(summary.facts_updated, 0);
    assert_eq!(store.row_count("fact_neonatal_deaths").unwrap(), 1);
    let total: i64 = store
        .connection()
        .query_row("SELECT total_deces FROM fact_neonatal_deaths", [], |r| r.get(0))
        .unwrap();
    assert_eq!(total, 5);
}

#[test]
fn test_run_without_geography_skips_sync() {
    let dir = tempdir().unwrap();
    let file = create_test_file("Pays;Période;Nouveau-nes decedes de 0-6 jours\nMali;Mars 2025;2\n");
    let config = SmiConfig {
        data_root: dir.path().join("data"),
        warehouse: dir.path().join("data/warehouse.db"),
        ..SmiConfig::default()
    };
    let smi = Smi::with_config(config);

    let summary = smi.run_file(file.path(), "run-1").unwrap();

    assert!(summary.sync.is_none());
    assert_eq!(summary.report.final_rows, 1);
    assert!(smi.config().silver_path().exists());
    // an explicit sync still reports the structural problem
    assert!(matches!(smi.synchronize_silver("run-1"), Err(SmiError::MissingColumn(_))));
}
