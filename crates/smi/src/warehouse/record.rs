//! Typed view of cleaned records, as consumed by the synchronizers.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SmiError};
use crate::schema::column::{GEO_ID, PERIOD_DATE};
use crate::schema::{ColumnRole, ColumnRoles, GeoField, RecordSet, Value};
use crate::transform::CalendarFields;

/// The six geography levels of one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geography {
    pub country: String,
    pub region: String,
    pub province: String,
    pub district: String,
    pub commune: String,
    pub facility: String,
}

impl Geography {
    /// Field for one level.
    pub fn field(&self, level: GeoField) -> &str {
        match level {
            GeoField::Country => &self.country,
            GeoField::Region => &self.region,
            GeoField::Province => &self.province,
            GeoField::District => &self.district,
            GeoField::Commune => &self.commune,
            GeoField::Facility => &self.facility,
        }
    }
}

/// A parsed reporting period with its calendar attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
    pub semester: u32,
}

impl From<NaiveDate> for Period {
    fn from(date: NaiveDate) -> Self {
        let cal = CalendarFields::from_date(date);
        Self {
            date,
            year: cal.year,
            month: cal.month,
            quarter: cal.quarter,
            semester: cal.semester,
        }
    }
}

/// One row of the cleaned record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub geography: Geography,
    pub geo_id: String,
    /// Absent when the period label could not be parsed.
    pub period: Option<Period>,
    /// Count indicators, zero-filled.
    pub counts: IndexMap<String, i64>,
    /// Ratio indicators; absent values are not present in the map.
    pub ratios: IndexMap<String, f64>,
}

impl CleanedRecord {
    /// Project a cleaned record set into typed records.
    ///
    /// The record set must carry all six geography columns and `geo_id`.
    pub fn from_record_set(records: &RecordSet) -> Result<Vec<CleanedRecord>> {
        let roles = ColumnRoles::classify(&records.columns);

        let mut geo_indices = Vec::with_capacity(GeoField::ALL.len());
        for field in GeoField::ALL {
            let idx = roles
                .geography(field)
                .and_then(|c| records.column_index(c))
                .ok_or_else(|| SmiError::MissingColumn(field.column().to_string()))?;
            geo_indices.push(idx);
        }
        let geo_id_idx = records
            .column_index(GEO_ID)
            .ok_or_else(|| SmiError::MissingColumn(GEO_ID.to_string()))?;
        let period_idx = records.column_index(PERIOD_DATE);

        let counter_cols: Vec<(usize, &str)> = measure_columns(records, &roles, ColumnRole::Counter);
        let ratio_cols: Vec<(usize, &str)> = measure_columns(records, &roles, ColumnRole::Ratio);

        records
            .rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let text = |idx: usize, column: &str| {
                    row[idx].to_text().ok_or_else(|| {
                        SmiError::MissingColumn(format!("{} is absent in row {}", column, row_idx + 1))
                    })
                };

                let fields = geo_indices
                    .iter()
                    .zip(GeoField::ALL)
                    .map(|(&idx, field)| text(idx, field.column()))
                    .collect::<Result<Vec<String>>>()?;
                let [country, region, province, district, commune, facility]: [String; 6] = fields
                    .try_into()
                    .map_err(|_| SmiError::MissingColumn("geography".to_string()))?;

                let counts = counter_cols
                    .iter()
                    .map(|&(idx, column)| (column.to_string(), row[idx].as_i64().unwrap_or(0)))
                    .collect();
                let ratios = ratio_cols
                    .iter()
                    .filter_map(|&(idx, column)| row[idx].as_f64().map(|v| (column.to_string(), v)))
                    .collect();

                Ok(CleanedRecord {
                    geography: Geography {
                        country,
                        region,
                        province,
                        district,
                        commune,
                        facility,
                    },
                    geo_id: text(geo_id_idx, GEO_ID)?,
                    period: period_idx.and_then(|i| row[i].as_date()).map(Period::from),
                    counts,
                    ratios,
                })
            })
            .collect()
    }

    /// Value of an indicator, count or ratio.
    pub fn measure(&self, column: &str) -> Option<f64> {
        self.counts
            .get(column)
            .map(|&v| v as f64)
            .or_else(|| self.ratios.get(column).copied())
    }

    pub fn has_measure(&self, column: &str) -> bool {
        self.counts.contains_key(column) || self.ratios.contains_key(column)
    }
}

fn measure_columns<'a>(
    records: &'a RecordSet,
    roles: &ColumnRoles,
    role: ColumnRole,
) -> Vec<(usize, &'a str)> {
    records
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| roles.role_of(c) == role)
        .map(|(i, c)| (i, c.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned() -> RecordSet {
        RecordSet::new(
            vec![
                "pays".into(),
                "region".into(),
                "province".into(),
                "district_sanitaire".into(),
                "commune".into(),
                "formation_sanitaire".into(),
                "geo_id".into(),
                "periode_date".into(),
                "deces_neo_0_6_jours".into(),
                "smi_taux_mortalite".into(),
            ],
            vec![
                vec![
                    "Mali".into(),
                    "Kayes".into(),
                    "Kita".into(),
                    "Ds Kita".into(),
                    "Kita".into(),
                    "Csref Kita".into(),
                    "mali_kayes_kita_ds_kita_kita_csref_kita".into(),
                    Value::Date(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()),
                    Value::Int(2),
                    Value::Null,
                ],
                vec![
                    "Mali".into(),
                    "Kayes".into(),
                    "Kita".into(),
                    "Ds Kita".into(),
                    "Kita".into(),
                    "Csref Kita".into(),
                    "mali_kayes_kita_ds_kita_kita_csref_kita".into(),
                    Value::Null,
                    Value::Int(0),
                    Value::Float(1.25),
                ],
            ],
        )
    }

    #[test]
    fn test_projection() {
        let records = CleanedRecord::from_record_set(&cleaned()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].geography.facility, "Csref Kita");
        assert_eq!(records[0].period.map(|p| p.quarter), Some(2));
        assert_eq!(records[0].counts["deces_neo_0_6_jours"], 2);
        assert!(!records[0].has_measure("smi_taux_mortalite"));
        assert_eq!(records[1].period, None);
        assert_eq!(records[1].measure("smi_taux_mortalite"), Some(1.25));
    }

    #[test]
    fn test_missing_geo_id_column() {
        let mut set = cleaned();
        set.columns[6] = "other".into();

        let result = CleanedRecord::from_record_set(&set);
        assert!(matches!(result, Err(SmiError::MissingColumn(c)) if c == "geo_id"));
    }
}
