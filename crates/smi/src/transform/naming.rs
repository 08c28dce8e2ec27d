//! Schema normalizer: raw column labels to unique canonical identifiers.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]").expect("valid regex"));
static UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").expect("valid regex"));

/// Long clinical phrases rewritten to short family prefixes. Keys are lower-case.
const PHRASE_PREFIXES: &[(&str, &str)] = &[
    ("décès maternels par cause de complication obstétricale", "deces_mat_"),
    ("deces maternels par cause de complication obstetricale", "deces_mat_"),
    ("nouveau-nés décédés de", "deces_neo_"),
    ("nouveau-nes decedes de", "deces_neo_"),
    ("smi-", "smi_"),
];

/// Replace accented Latin-1 letters with their unaccented form.
///
/// Characters outside the closed table pass through unchanged.
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
            'ç' => 'c',
            'Ç' => 'C',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'È' | 'É' | 'Ê' | 'Ë' => 'E',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
            'ý' | 'ÿ' => 'y',
            'Ý' => 'Y',
            other => other,
        })
        .collect()
}

/// Canonicalize one label. May return an empty string for labels with no
/// word characters; [`normalize_names`] fills those positionally.
pub fn canonical_name(label: &str) -> String {
    let mut name = WHITESPACE.replace_all(label.trim(), " ").to_lowercase();

    for (phrase, prefix) in PHRASE_PREFIXES {
        if name.contains(phrase) {
            name = name.replace(phrase, prefix);
        }
    }

    let name = fold_diacritics(&name.replace('-', "_"));
    let name = NON_WORD.replace_all(&name, "_");
    let name = UNDERSCORES.replace_all(&name, "_");
    name.trim_matches('_').to_string()
}

/// Canonicalize a header row. The result has the same length and order as
/// the input and contains no duplicates.
pub fn normalize_names<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(labels.len());
    let mut names = Vec::with_capacity(labels.len());

    for (pos, label) in labels.iter().enumerate() {
        let mut base = canonical_name(label.as_ref());
        if base.is_empty() {
            base = format!("column_{}", pos + 1);
        }

        let name = if used.contains(&base) {
            let mut n = 1;
            loop {
                let candidate = format!("{}_{}", base, n);
                if !used.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            }
        } else {
            base
        };

        used.insert(name.clone());
        names.push(name);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geography_headers() {
        let names = normalize_names(&[
            "Pays",
            "Région",
            "District  sanitaire",
            "Commune/arrondissement",
            "Formation sanitaire",
            "Période",
        ]);
        assert_eq!(
            names,
            vec![
                "pays",
                "region",
                "district_sanitaire",
                "commune_arrondissement",
                "formation_sanitaire",
                "periode"
            ]
        );
    }

    #[test]
    fn test_indicator_family_prefixes() {
        assert_eq!(
            canonical_name(
                "Décès maternels par cause de complication obstétricale [Hémorragie]"
            ),
            "deces_mat_hemorragie"
        );
        assert_eq!(
            canonical_name("Nouveau-nes decedes de 0-6 jours"),
            "deces_neo_0_6_jours"
        );
        assert_eq!(
            canonical_name("Nouveau-nés décédés de 7-28 jours"),
            "deces_neo_7_28_jours"
        );
        assert_eq!(
            canonical_name("SMI-Proportion de décès maternels audités"),
            "smi_proportion_de_deces_maternels_audites"
        );
    }

    #[test]
    fn test_duplicates_get_suffixes() {
        let names = normalize_names(&["Pays", "pays", " PAYS ", "pays_1"]);
        assert_eq!(names, vec!["pays", "pays_1", "pays_2", "pays_1_1"]);
    }

    #[test]
    fn test_empty_label_is_positional() {
        let names = normalize_names(&["Pays", "???", ""]);
        assert_eq!(names, vec!["pays", "column_2", "column_3"]);
    }

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("DS Léo çà"), "DS Leo ca");
        assert_eq!(fold_diacritics("Ñandú"), "Nandu");
    }
}
