//! Geography normalizer: canonical place names and the composite `geo_id`.

use tracing::warn;

use super::log::CleaningLog;
use super::naming::fold_diacritics;
use super::pipeline::Stage;
use crate::schema::column::GEO_ID;
use crate::schema::{ColumnRoles, GeoField, RecordSet, Value};

/// Trim, collapse inner whitespace and title-case each word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Natural key for a location: the six fields joined, lower-cased, space-free.
pub fn geo_id<S: AsRef<str>>(fields: &[S]) -> String {
    let joined = fields
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("_");
    fold_diacritics(&joined.replace(' ', "_").to_lowercase())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeographyNormalizer;

impl Stage for GeographyNormalizer {
    fn name(&self) -> &'static str {
        "geography"
    }

    fn apply(&self, mut records: RecordSet, roles: &ColumnRoles, log: &mut CleaningLog) -> RecordSet {
        for (_, column) in roles.geography_columns() {
            let Some(idx) = records.column_index(column) else {
                continue;
            };
            let changed = records
                .column_values(idx)
                .filter(|v| match v {
                    Value::Text(s) => title_case(s) != *s,
                    Value::Null => false,
                    _ => true,
                })
                .count();
            records = records.map_column(idx, |v| match v.to_text() {
                Some(text) => Value::Text(title_case(&text)),
                None => Value::Null,
            });
            log.record(self.name(), Some(column), changed, "normalized place names");
        }

        if !roles.has_full_geography() {
            let missing: Vec<&str> = GeoField::ALL
                .iter()
                .filter(|f| roles.geography(**f).is_none())
                .map(GeoField::column)
                .collect();
            warn!(missing = ?missing, "incomplete geography, geo_id not created");
            log.skip(self.name(), format!("missing geography columns {:?}", missing));
            return records;
        }

        let indices: Vec<usize> = GeoField::ALL
            .iter()
            .filter_map(|f| roles.geography(*f).and_then(|c| records.column_index(c)))
            .collect();
        let ids: Vec<Value> = records
            .rows
            .iter()
            .map(|row| {
                let fields: Vec<String> = indices
                    .iter()
                    .map(|&i| row[i].to_text().unwrap_or_default())
                    .collect();
                Value::Text(geo_id(&fields))
            })
            .collect();

        log.record(self.name(), Some(GEO_ID), ids.len(), "derived geo_id");
        records.with_column(GEO_ID, ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case(" burkina   faso "), "Burkina Faso");
        assert_eq!(title_case("DS Léo"), "Ds Léo");
        assert_eq!(title_case("BHM BOURA"), "Bhm Boura");
        assert_eq!(title_case("élan"), "Élan");
    }

    #[test]
    fn test_geo_id() {
        let id = geo_id(&["Burkina Faso", "Nando", "Sissili", "Ds Léo", "Boura", "Bhm Boura"]);
        assert_eq!(id, "burkina_faso_nando_sissili_ds_leo_boura_bhm_boura");
    }

    #[test]
    fn test_partial_geography_skips_geo_id() {
        let records = RecordSet::new(
            vec!["pays".into(), "region".into()],
            vec![vec![" mali ".into(), "kayes".into()]],
        );
        let roles = ColumnRoles::classify(&records.columns);
        let mut log = CleaningLog::new();

        let out = GeographyNormalizer.apply(records, &roles, &mut log);

        assert_eq!(out.value(0, "pays"), Some(&Value::from("Mali")));
        assert!(!out.has_column(GEO_ID));
        assert_eq!(log.skipped.len(), 1);
    }
}
