//! Dimension and fact synchronizers.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::calendar::DateRow;
use super::facts::FACT_TABLES;
use super::record::{CleanedRecord, Geography};
use super::store::{FactWrite, WarehouseStore};
use crate::error::{Result, SmiError};

/// Counts from one synchronization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub batch_id: String,
    pub geographies_inserted: usize,
    pub dates_inserted: usize,
    pub facts_inserted: usize,
    pub facts_updated: usize,
    /// Records left out of the facts because their period is absent.
    pub skipped_without_period: usize,
}

/// Insert the geography and date rows the records need.
///
/// An existing current geography row is left as it is, even when its
/// attributes differ from the incoming record.
pub fn sync_dimensions<S: WarehouseStore>(
    store: &S,
    records: &[CleanedRecord],
    effective_date: NaiveDate,
    summary: &mut SyncSummary,
) -> Result<()> {
    let mut geographies: IndexMap<&str, &Geography> = IndexMap::new();
    let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
    for record in records {
        geographies
            .entry(record.geo_id.as_str())
            .or_insert(&record.geography);
        if let Some(period) = record.period {
            dates.insert(period.date);
        }
    }

    for (geo_id, geography) in &geographies {
        if store.insert_geography(geo_id, geography, effective_date)? {
            summary.geographies_inserted += 1;
        }
    }
    for date in &dates {
        if store.insert_date(&DateRow::from_date(*date))? {
            summary.dates_inserted += 1;
        }
    }

    debug!(
        geographies = geographies.len(),
        dates = dates.len(),
        inserted_geographies = summary.geographies_inserted,
        inserted_dates = summary.dates_inserted,
        "dimensions synchronized"
    );
    Ok(())
}

/// Upsert one fact row per record and table, keyed by current dimension keys.
///
/// Records sharing a `(geo_id, period)` pair within the batch collapse to the
/// last one, so the summary only counts updates of rows from earlier runs.
pub fn sync_facts<S: WarehouseStore>(
    store: &S,
    records: &[CleanedRecord],
    batch_id: &str,
    summary: &mut SyncSummary,
) -> Result<()> {
    let mut latest: IndexMap<(&str, NaiveDate), &CleanedRecord> = IndexMap::new();
    for record in records {
        let Some(period) = record.period else {
            summary.skipped_without_period += 1;
            continue;
        };
        if latest.insert((record.geo_id.as_str(), period.date), record).is_some() {
            debug!(geo_id = %record.geo_id, period = %period.date, "duplicate fact key in batch, keeping last");
        }
    }

    for ((geo_id, date), record) in latest {

        let geo_key = store.current_geo_key(geo_id)?.ok_or_else(|| {
            SmiError::Persistence(format!("no current geography row for '{}'", geo_id))
        })?;
        let date_key = store.date_key(date)?.ok_or_else(|| {
            SmiError::Persistence(format!("no date row for {}", date))
        })?;

        for spec in FACT_TABLES.iter().filter(|s| s.applies_to(record)) {
            let measures = spec.resolve(record);
            match store.upsert_fact(spec, geo_key, date_key, &measures, batch_id)? {
                FactWrite::Inserted => summary.facts_inserted += 1,
                FactWrite::Updated => summary.facts_updated += 1,
            }
        }
    }

    if summary.skipped_without_period > 0 {
        warn!(
            records = summary.skipped_without_period,
            "records without a period left out of facts"
        );
    }
    Ok(())
}

/// Synchronize dimensions then facts in one transaction.
///
/// A store error rolls back the whole batch and is returned to the caller.
pub fn synchronize<S: WarehouseStore>(
    store: &S,
    records: &[CleanedRecord],
    batch_id: &str,
) -> Result<SyncSummary> {
    synchronize_at(store, records, batch_id, Utc::now().date_naive())
}

/// [`synchronize`] with an explicit effective date for new geography rows.
pub fn synchronize_at<S: WarehouseStore>(
    store: &S,
    records: &[CleanedRecord],
    batch_id: &str,
    effective_date: NaiveDate,
) -> Result<SyncSummary> {
    info!(batch_id, records = records.len(), "synchronization started");

    let summary = store.in_transaction(|s| {
        let mut summary = SyncSummary {
            batch_id: batch_id.to_string(),
            ..SyncSummary::default()
        };
        sync_dimensions(s, records, effective_date, &mut summary)?;
        sync_facts(s, records, batch_id, &mut summary)?;
        Ok(summary)
    })?;

    info!(
        batch_id,
        geographies_inserted = summary.geographies_inserted,
        dates_inserted = summary.dates_inserted,
        facts_inserted = summary.facts_inserted,
        facts_updated = summary.facts_updated,
        "synchronization finished"
    );
    Ok(summary)
}
