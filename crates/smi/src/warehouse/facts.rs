//! Fact table declarations.

use serde::Serialize;

use super::record::CleanedRecord;

/// Storage type of a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureKind {
    Count,
    Ratio,
}

impl MeasureKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            MeasureKind::Count => "INTEGER",
            MeasureKind::Ratio => "REAL",
        }
    }
}

/// A measure column and the cleaned columns it can be read from, in
/// order of preference.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MeasureSpec {
    pub column: &'static str,
    pub kind: MeasureKind,
    pub sources: &'static [&'static str],
}

/// A measure resolved for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasureValue {
    Count(i64),
    Ratio(f64),
    Absent,
}

impl MeasureSpec {
    /// Read the measure from a record. The first present source wins.
    pub fn resolve(&self, record: &CleanedRecord) -> MeasureValue {
        for source in self.sources {
            match self.kind {
                MeasureKind::Count => {
                    if let Some(&v) = record.counts.get(*source) {
                        return MeasureValue::Count(v);
                    }
                }
                MeasureKind::Ratio => {
                    if let Some(v) = record.measure(source) {
                        return MeasureValue::Ratio(v);
                    }
                }
            }
        }
        MeasureValue::Absent
    }
}

/// A fact table keyed by `(geo_key, date_key)`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FactTableSpec {
    pub table: &'static str,
    pub measures: &'static [MeasureSpec],
}

impl FactTableSpec {
    /// True when the record carries at least one of the table's measures.
    pub fn applies_to(&self, record: &CleanedRecord) -> bool {
        self.measures
            .iter()
            .any(|m| m.sources.iter().any(|s| record.has_measure(s)))
    }

    /// Measures of one record, in declaration order.
    pub fn resolve(&self, record: &CleanedRecord) -> Vec<MeasureValue> {
        self.measures.iter().map(|m| m.resolve(record)).collect()
    }
}

pub const NEONATAL_DEATHS: FactTableSpec = FactTableSpec {
    table: "fact_neonatal_deaths",
    measures: &[
        MeasureSpec {
            column: "deces_0_6_jours",
            kind: MeasureKind::Count,
            sources: &["deces_neo_0_6_jours", "nouveau_nes_decedes_0_6_jours"],
        },
        MeasureSpec {
            column: "deces_7_28_jours",
            kind: MeasureKind::Count,
            sources: &["deces_neo_7_28_jours", "nouveau_nes_decedes_7_28_jours"],
        },
        MeasureSpec {
            column: "deces_communaute",
            kind: MeasureKind::Count,
            sources: &["deces_neonatals_communaute"],
        },
        MeasureSpec {
            column: "total_deces",
            kind: MeasureKind::Count,
            sources: &["total_deces_neonatals"],
        },
        MeasureSpec {
            column: "taux_mortalite_neonatale",
            kind: MeasureKind::Ratio,
            sources: &["taux_mortalite_neonatale", "smi_taux_mortalite_neonatale"],
        },
    ],
};

pub const MATERNAL_DEATHS: FactTableSpec = FactTableSpec {
    table: "fact_maternal_deaths",
    measures: &[
        MeasureSpec {
            column: "deces_declares",
            kind: MeasureKind::Count,
            sources: &["deces_mat_total", "deces_mat"],
        },
        MeasureSpec {
            column: "total_deces_causes",
            kind: MeasureKind::Count,
            sources: &["total_deces_maternels_calcule"],
        },
        MeasureSpec {
            column: "deces_audites",
            kind: MeasureKind::Count,
            sources: &["nombre_de_deces_maternels_audites"],
        },
        MeasureSpec {
            column: "proportion_audites",
            kind: MeasureKind::Ratio,
            sources: &["smi_proportion_de_deces_maternels_audites"],
        },
    ],
};

/// Every fact table the warehouse maintains.
pub const FACT_TABLES: &[FactTableSpec] = &[NEONATAL_DEATHS, MATERNAL_DEATHS];
