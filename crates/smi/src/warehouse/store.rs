//! Warehouse store seam and its SQLite implementation.
//!
//! Every write is a single conditional statement, so two runs can never
//! interleave a read-check with a write.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use super::calendar::DateRow;
use super::facts::{FactTableSpec, MeasureValue, FACT_TABLES};
use super::record::Geography;
use crate::error::{Result, SmiError};

/// Outcome of a fact upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactWrite {
    Inserted,
    Updated,
}

/// Conditional writes and key lookups the synchronizers need.
pub trait WarehouseStore {
    /// Insert a current geography row unless one exists for `geo_id`.
    /// Returns true when a row was inserted.
    fn insert_geography(
        &self,
        geo_id: &str,
        geography: &Geography,
        effective_date: NaiveDate,
    ) -> Result<bool>;

    /// Insert a date row unless its key exists. Returns true when inserted.
    fn insert_date(&self, row: &DateRow) -> Result<bool>;

    /// Surrogate key of the current geography row for `geo_id`.
    fn current_geo_key(&self, geo_id: &str) -> Result<Option<i64>>;

    /// Surrogate key of the date-dimension row for `date`.
    fn date_key(&self, date: NaiveDate) -> Result<Option<i64>>;

    /// Insert a fact row, or replace its measures and batch id.
    fn upsert_fact(
        &self,
        spec: &FactTableSpec,
        geo_key: i64,
        date_key: i64,
        measures: &[MeasureValue],
        batch_id: &str,
    ) -> Result<FactWrite>;

    /// Run `f` in one transaction; commit on `Ok`, roll back on `Err`.
    fn in_transaction<T, F>(&self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&Self) -> Result<T>;
}

const DIMENSION_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS dim_geography (
    geo_key             INTEGER PRIMARY KEY AUTOINCREMENT,
    geo_id              TEXT NOT NULL,
    pays                TEXT NOT NULL,
    region              TEXT NOT NULL,
    province            TEXT NOT NULL,
    district_sanitaire  TEXT NOT NULL,
    commune             TEXT NOT NULL,
    formation_sanitaire TEXT NOT NULL,
    effective_date      TEXT NOT NULL,
    is_current          INTEGER NOT NULL DEFAULT 1
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_dim_geography_current
    ON dim_geography (geo_id) WHERE is_current = 1;

CREATE TABLE IF NOT EXISTS dim_date (
    date_key        INTEGER PRIMARY KEY,
    date            TEXT NOT NULL UNIQUE,
    annee           INTEGER NOT NULL,
    trimestre       INTEGER NOT NULL,
    mois            INTEGER NOT NULL,
    semaine         INTEGER NOT NULL,
    jour            INTEGER NOT NULL,
    semestre        INTEGER NOT NULL,
    nom_mois        TEXT NOT NULL,
    est_debut_mois  INTEGER NOT NULL,
    est_fin_mois    INTEGER NOT NULL
);
";

fn fact_table_ddl(spec: &FactTableSpec) -> String {
    let measures: String = spec
        .measures
        .iter()
        .map(|m| format!("    {} {},\n", m.column, m.kind.sql_type()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
    fact_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    geo_key   INTEGER NOT NULL REFERENCES dim_geography (geo_key),
    date_key  INTEGER NOT NULL REFERENCES dim_date (date_key),
{measures}    batch_id  TEXT NOT NULL,
    revision  INTEGER NOT NULL DEFAULT 0,
    UNIQUE (geo_key, date_key)
);",
        table = spec.table,
        measures = measures,
    )
}

fn fact_upsert_sql(spec: &FactTableSpec) -> String {
    let columns: Vec<&str> = spec.measures.iter().map(|m| m.column).collect();
    let placeholders: Vec<String> = (0..columns.len()).map(|i| format!("?{}", i + 3)).collect();
    let updates: Vec<String> = columns
        .iter()
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();
    format!(
        "INSERT INTO {table} (geo_key, date_key, {columns}, batch_id)
         VALUES (?1, ?2, {placeholders}, ?{batch})
         ON CONFLICT (geo_key, date_key) DO UPDATE SET
             {updates}, batch_id = excluded.batch_id, revision = revision + 1
         RETURNING revision",
        table = spec.table,
        columns = columns.join(", "),
        placeholders = placeholders.join(", "),
        batch = columns.len() + 3,
        updates = updates.join(", "),
    )
}

/// SQLite-backed warehouse.
pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    /// Open (or create) a warehouse file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| SmiError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(DIMENSION_SCHEMA)?;
        for spec in FACT_TABLES {
            conn.execute_batch(&fact_table_ddl(spec))?;
        }
        Ok(Self { conn })
    }

    /// Underlying connection, for ad-hoc queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of rows in one of the warehouse tables.
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let known = table == "dim_geography"
            || table == "dim_date"
            || FACT_TABLES.iter().any(|s| s.table == table);
        if !known {
            return Err(SmiError::Config(format!("unknown warehouse table '{}'", table)));
        }
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        Ok(count as usize)
    }
}

impl WarehouseStore for SqliteWarehouse {
    fn insert_geography(
        &self,
        geo_id: &str,
        geography: &Geography,
        effective_date: NaiveDate,
    ) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO dim_geography (
                 geo_id, pays, region, province, district_sanitaire, commune,
                 formation_sanitaire, effective_date, is_current
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1)
             ON CONFLICT (geo_id) WHERE is_current = 1 DO NOTHING",
        )?;
        let inserted = stmt.execute(params![
            geo_id,
            geography.country,
            geography.region,
            geography.province,
            geography.district,
            geography.commune,
            geography.facility,
            effective_date,
        ])?;
        Ok(inserted == 1)
    }

    fn insert_date(&self, row: &DateRow) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO dim_date (
                 date_key, date, annee, trimestre, mois, semaine, jour, semestre,
                 nom_mois, est_debut_mois, est_fin_mois
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT (date_key) DO NOTHING",
        )?;
        let inserted = stmt.execute(params![
            row.date_key,
            row.date,
            row.year,
            row.quarter,
            row.month,
            row.week,
            row.day,
            row.semester,
            row.month_name,
            row.is_month_start,
            row.is_month_end,
        ])?;
        Ok(inserted == 1)
    }

    fn current_geo_key(&self, geo_id: &str) -> Result<Option<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT geo_key FROM dim_geography WHERE geo_id = ?1 AND is_current = 1")?;
        Ok(stmt.query_row([geo_id], |r| r.get(0)).optional()?)
    }

    fn date_key(&self, date: NaiveDate) -> Result<Option<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT date_key FROM dim_date WHERE date = ?1")?;
        Ok(stmt.query_row([date], |r| r.get(0)).optional()?)
    }

    fn upsert_fact(
        &self,
        spec: &FactTableSpec,
        geo_key: i64,
        date_key: i64,
        measures: &[MeasureValue],
        batch_id: &str,
    ) -> Result<FactWrite> {
        let mut values: Vec<SqlValue> = Vec::with_capacity(measures.len() + 3);
        values.push(SqlValue::Integer(geo_key));
        values.push(SqlValue::Integer(date_key));
        values.extend(measures.iter().map(|m| match m {
            MeasureValue::Count(v) => SqlValue::Integer(*v),
            MeasureValue::Ratio(v) => SqlValue::Real(*v),
            MeasureValue::Absent => SqlValue::Null,
        }));
        values.push(SqlValue::Text(batch_id.to_string()));

        let mut stmt = self.conn.prepare_cached(&fact_upsert_sql(spec))?;
        let revision: i64 = stmt.query_row(params_from_iter(values), |r| r.get(0))?;
        debug!(table = spec.table, geo_key, date_key, revision, "fact upserted");

        Ok(if revision == 0 {
            FactWrite::Inserted
        } else {
            FactWrite::Updated
        })
    }

    fn in_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    debug!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }
}
