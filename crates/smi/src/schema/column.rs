//! Column-role registry.
//!
//! Roles are assigned once, from the canonical identifiers produced by the
//! schema normalizer. Later stages ask the registry which column plays a role
//! instead of scanning identifiers themselves.

use serde::{Deserialize, Serialize};

/// Parsed period date column added by the period parser.
pub const PERIOD_DATE: &str = "periode_date";
/// Calendar year of the period.
pub const YEAR: &str = "annee";
/// Calendar month (1-12) of the period.
pub const MONTH: &str = "mois";
/// Calendar quarter (1-4) of the period.
pub const QUARTER: &str = "trimestre";
/// Semester (1-2) of the period.
pub const SEMESTER: &str = "semestre";
/// Composite geography key added by the geography normalizer.
pub const GEO_ID: &str = "geo_id";
/// Sum of the maternal-death causes.
pub const MATERNAL_TOTAL: &str = "total_deces_maternels_calcule";
/// Sum of the two neonatal age bands.
pub const NEONATAL_TOTAL: &str = "total_deces_neonatals";

/// Neonatal deaths during the first week of life.
pub const NEONATAL_EARLY: &str = "deces_neo_0_6_jours";
/// Neonatal deaths from day 7 to day 28.
pub const NEONATAL_LATE: &str = "deces_neo_7_28_jours";

/// Prefix shared by the maternal-death-by-cause family.
const MATERNAL_CAUSE_PREFIX: &str = "deces_mat_";
/// Pre-existing grand totals of the maternal family, excluded from the cause sum.
const MATERNAL_GRAND_TOTALS: &[&str] = &["deces_mat", "deces_mat_total"];

const PERIOD_COLUMNS: &[&str] = &["periode", "period"];
const COUNTER_FRAGMENTS: &[&str] = &["deces", "nombre"];
const RATIO_FRAGMENTS: &[&str] = &["taux", "proportion", "ratio", "pourcentage"];
const RATIO_PREFIX: &str = "smi_";

/// One of the six geography levels, from country down to facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoField {
    Country,
    Region,
    Province,
    District,
    Commune,
    Facility,
}

impl GeoField {
    /// All levels, in `geo_id` order.
    pub const ALL: [GeoField; 6] = [
        GeoField::Country,
        GeoField::Region,
        GeoField::Province,
        GeoField::District,
        GeoField::Commune,
        GeoField::Facility,
    ];

    /// Canonical column identifier.
    pub fn column(&self) -> &'static str {
        match self {
            GeoField::Country => "pays",
            GeoField::Region => "region",
            GeoField::Province => "province",
            GeoField::District => "district_sanitaire",
            GeoField::Commune => "commune",
            GeoField::Facility => "formation_sanitaire",
        }
    }

    /// Identifiers accepted for this level, canonical first.
    fn accepted(&self) -> &'static [&'static str] {
        match self {
            GeoField::Country => &["pays"],
            GeoField::Region => &["region"],
            GeoField::Province => &["province"],
            GeoField::District => &["district_sanitaire"],
            GeoField::Commune => &["commune", "commune_arrondissement"],
            GeoField::Facility => &["formation_sanitaire"],
        }
    }
}

/// Classification of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Geography(GeoField),
    Period,
    /// Count indicator: missing means zero.
    Counter,
    /// Ratio or percentage indicator: missing stays missing.
    Ratio,
    Other,
}

/// Declared mapping from logical role to concrete column identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnRoles {
    geography: Vec<(GeoField, String)>,
    period: Option<String>,
    counters: Vec<String>,
    ratios: Vec<String>,
    maternal_causes: Vec<String>,
    neonatal_parts: Option<(String, String)>,
}

impl ColumnRoles {
    /// Build the registry from canonical column identifiers.
    pub fn classify<S: AsRef<str>>(columns: &[S]) -> Self {
        let mut roles = ColumnRoles::default();

        for field in GeoField::ALL {
            let found = field
                .accepted()
                .iter()
                .find(|name| columns.iter().any(|c| c.as_ref() == **name));
            if let Some(name) = found {
                roles.geography.push((field, name.to_string()));
            }
        }

        roles.period = PERIOD_COLUMNS
            .iter()
            .find(|p| columns.iter().any(|c| c.as_ref() == **p))
            .map(|p| p.to_string());

        for column in columns.iter().map(AsRef::as_ref) {
            match roles.role_of(column) {
                ColumnRole::Counter => {
                    roles.counters.push(column.to_string());
                    if column.starts_with(MATERNAL_CAUSE_PREFIX)
                        && !MATERNAL_GRAND_TOTALS.contains(&column)
                    {
                        roles.maternal_causes.push(column.to_string());
                    }
                }
                ColumnRole::Ratio => roles.ratios.push(column.to_string()),
                _ => {}
            }
        }

        let has = |name: &str| columns.iter().any(|c| c.as_ref() == name);
        if has(NEONATAL_EARLY) && has(NEONATAL_LATE) {
            roles.neonatal_parts = Some((NEONATAL_EARLY.to_string(), NEONATAL_LATE.to_string()));
        }

        roles
    }

    /// Role of a column identifier under this registry's rules.
    pub fn role_of(&self, column: &str) -> ColumnRole {
        if let Some((field, _)) = self.geography.iter().find(|(_, c)| c == column) {
            return ColumnRole::Geography(*field);
        }
        if self.period.as_deref() == Some(column) {
            return ColumnRole::Period;
        }
        if column == MATERNAL_TOTAL || column == NEONATAL_TOTAL {
            return ColumnRole::Counter;
        }
        if column.starts_with(RATIO_PREFIX) || RATIO_FRAGMENTS.iter().any(|f| column.contains(f)) {
            return ColumnRole::Ratio;
        }
        if COUNTER_FRAGMENTS.iter().any(|f| column.contains(f)) {
            return ColumnRole::Counter;
        }
        ColumnRole::Other
    }

    /// Column holding a geography level, if present.
    pub fn geography(&self, field: GeoField) -> Option<&str> {
        self.geography
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c.as_str())
    }

    /// Geography columns that exist in the record set.
    pub fn geography_columns(&self) -> impl Iterator<Item = (GeoField, &str)> {
        self.geography.iter().map(|(f, c)| (*f, c.as_str()))
    }

    /// True when all six geography levels are present.
    pub fn has_full_geography(&self) -> bool {
        self.geography.len() == GeoField::ALL.len()
    }

    pub fn period(&self) -> Option<&str> {
        self.period.as_deref()
    }

    /// Count-indicator columns from the source schema.
    pub fn counters(&self) -> &[String] {
        &self.counters
    }

    /// Ratio/percentage columns from the source schema.
    pub fn ratios(&self) -> &[String] {
        &self.ratios
    }

    /// Maternal-death-by-cause columns, grand totals excluded.
    pub fn maternal_causes(&self) -> &[String] {
        &self.maternal_causes
    }

    /// The two neonatal age-band columns, when both exist.
    pub fn neonatal_parts(&self) -> Option<(&str, &str)> {
        self.neonatal_parts
            .as_ref()
            .map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// Counter check that also covers derived totals.
    pub fn is_counter(&self, column: &str) -> bool {
        self.role_of(column) == ColumnRole::Counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<&'static str> {
        vec![
            "pays",
            "region",
            "province",
            "district_sanitaire",
            "commune_arrondissement",
            "formation_sanitaire",
            "periode",
            "deces_mat",
            "deces_mat_hemorragie",
            "deces_mat_eclampsie",
            "deces_neo_0_6_jours",
            "deces_neo_7_28_jours",
            "nombre_de_deces_maternels_audites",
            "smi_proportion_de_deces_maternels_audites",
            "commentaire",
        ]
    }

    #[test]
    fn test_geography_with_alias() {
        let roles = ColumnRoles::classify(&columns());

        assert!(roles.has_full_geography());
        assert_eq!(roles.geography(GeoField::Commune), Some("commune_arrondissement"));
        assert_eq!(roles.geography(GeoField::Facility), Some("formation_sanitaire"));
    }

    #[test]
    fn test_counters_and_ratios() {
        let roles = ColumnRoles::classify(&columns());

        assert!(roles.counters().contains(&"deces_mat".to_string()));
        assert!(roles.counters().contains(&"nombre_de_deces_maternels_audites".to_string()));
        // a proportion of deaths is a ratio even though it mentions deaths
        assert_eq!(
            roles.role_of("smi_proportion_de_deces_maternels_audites"),
            ColumnRole::Ratio
        );
        assert!(!roles.counters().contains(&"smi_proportion_de_deces_maternels_audites".to_string()));
        assert_eq!(roles.role_of("commentaire"), ColumnRole::Other);
    }

    #[test]
    fn test_maternal_family_excludes_grand_total() {
        let roles = ColumnRoles::classify(&columns());
        assert_eq!(
            roles.maternal_causes(),
            &["deces_mat_hemorragie".to_string(), "deces_mat_eclampsie".to_string()]
        );
    }

    #[test]
    fn test_neonatal_parts_need_both() {
        let roles = ColumnRoles::classify(&columns());
        assert_eq!(roles.neonatal_parts(), Some((NEONATAL_EARLY, NEONATAL_LATE)));

        let partial = ColumnRoles::classify(&["deces_neo_0_6_jours"]);
        assert_eq!(partial.neonatal_parts(), None);
    }

    #[test]
    fn test_derived_totals_are_counters() {
        let roles = ColumnRoles::classify(&["pays"]);
        assert!(roles.is_counter(NEONATAL_TOTAL));
        assert!(roles.is_counter(MATERNAL_TOTAL));
        assert!(!roles.is_counter(YEAR));
    }
}
