//! Period parser: free-text reporting periods to calendar attributes.

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use super::log::CleaningLog;
use super::pipeline::Stage;
use crate::schema::column::{MONTH, PERIOD_DATE, QUARTER, SEMESTER, YEAR};
use crate::schema::{ColumnRoles, RecordSet, Value};

/// Month names translated before date parsing.
const MONTH_NAMES: &[(&str, &str)] = &[
    ("janvier", "january"),
    ("février", "february"),
    ("fevrier", "february"),
    ("mars", "march"),
    ("avril", "april"),
    ("mai", "may"),
    ("juin", "june"),
    ("juillet", "july"),
    ("août", "august"),
    ("aout", "august"),
    ("septembre", "september"),
    ("octobre", "october"),
    ("novembre", "november"),
    ("décembre", "december"),
    ("decembre", "december"),
];

/// Accepted layouts, tried in order. The day is supplied by the parser.
const LAYOUTS: &[&str] = &["%d %B %Y", "%d %B-%Y"];

/// Calendar attributes derived from a period date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
    pub semester: u32,
}

impl CalendarFields {
    pub fn from_date(date: NaiveDate) -> Self {
        let month = date.month();
        Self {
            year: date.year(),
            month,
            quarter: (month - 1) / 3 + 1,
            semester: if month <= 6 { 1 } else { 2 },
        }
    }
}

/// Parse a period label to the first day of its month.
pub fn parse_period(label: &str) -> Option<NaiveDate> {
    let label = label.trim().to_lowercase();
    let label = label.split_whitespace().collect::<Vec<_>>().join(" ");

    let year = label.rsplit([' ', '-']).next()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let split = label.find([' ', '-'])?;
    let (month, rest) = label.split_at(split);
    let month = MONTH_NAMES
        .iter()
        .find(|(fr, _)| *fr == month)
        .map_or(month, |(_, en)| *en);
    let candidate = format!("1 {}{}", month, rest);

    LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(&candidate, layout).ok())
}

/// Period of a cell: text is parsed, a date maps to the first of its month.
fn period_of(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Text(s) => parse_period(s),
        Value::Date(d) => d.with_day(1),
        _ => None,
    }
}

/// Adds `periode_date`, `annee`, `mois`, `trimestre` and `semestre`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodParser;

impl Stage for PeriodParser {
    fn name(&self) -> &'static str {
        "period"
    }

    fn apply(&self, records: RecordSet, roles: &ColumnRoles, log: &mut CleaningLog) -> RecordSet {
        let Some(idx) = roles.period().and_then(|c| records.column_index(c)) else {
            warn!("period column not found, calendar fields not added");
            log.skip(self.name(), "period column not found");
            return records;
        };

        let dates: Vec<Option<NaiveDate>> = records.column_values(idx).map(period_of).collect();
        let parsed = dates.iter().filter(|d| d.is_some()).count();
        let unparsed = dates.len() - parsed;

        if unparsed > 0 {
            warn!(rows = unparsed, "unparseable periods left absent");
        }
        info!(parsed, total = dates.len(), "periods parsed");
        log.unparsed_periods += unparsed;
        log.record(self.name(), Some(PERIOD_DATE), parsed, "parsed period labels");

        let calendar: Vec<Option<CalendarFields>> =
            dates.iter().map(|d| d.map(CalendarFields::from_date)).collect();
        let field = |f: fn(&CalendarFields) -> i64| -> Vec<Value> {
            calendar.iter().map(|c| c.as_ref().map(f).into()).collect()
        };

        let years = field(|c| i64::from(c.year));
        let months = field(|c| i64::from(c.month));
        let quarters = field(|c| i64::from(c.quarter));
        let semesters = field(|c| i64::from(c.semester));

        records
            .with_column(PERIOD_DATE, dates.into_iter().map(Value::from).collect())
            .with_column(YEAR, years)
            .with_column(MONTH, months)
            .with_column(QUARTER, quarters)
            .with_column(SEMESTER, semesters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_french_months() {
        assert_eq!(parse_period("Janvier 2025"), Some(ymd(2025, 1, 1)));
        assert_eq!(parse_period("  FÉVRIER 2024 "), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_period("août-2023"), Some(ymd(2023, 8, 1)));
        assert_eq!(parse_period("Decembre  2022"), Some(ymd(2022, 12, 1)));
    }

    #[test]
    fn test_english_months_pass_through() {
        assert_eq!(parse_period("March 2025"), Some(ymd(2025, 3, 1)));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_period(""), None);
        assert_eq!(parse_period("T1 2025"), None);
        assert_eq!(parse_period("janvier 25"), None);
        assert_eq!(parse_period("2025"), None);
    }

    #[test]
    fn test_calendar_fields() {
        let fields = CalendarFields::from_date(ymd(2025, 7, 1));
        assert_eq!(fields.quarter, 3);
        assert_eq!(fields.semester, 2);

        let fields = CalendarFields::from_date(ymd(2025, 6, 1));
        assert_eq!(fields.quarter, 2);
        assert_eq!(fields.semester, 1);
    }

    #[test]
    fn test_unparsed_row_kept_with_absent_fields() {
        let records = RecordSet::new(
            vec!["periode".into()],
            vec![vec!["Mars 2025".into()], vec!["inconnu".into()]],
        );
        let roles = ColumnRoles::classify(&records.columns);
        let mut log = CleaningLog::new();

        let out = PeriodParser.apply(records, &roles, &mut log);

        assert_eq!(out.row_count(), 2);
        assert_eq!(log.unparsed_periods, 1);
        assert_eq!(out.value(0, PERIOD_DATE), Some(&Value::Date(ymd(2025, 3, 1))));
        assert_eq!(out.value(0, QUARTER), Some(&Value::Int(1)));
        for column in [PERIOD_DATE, YEAR, MONTH, QUARTER, SEMESTER] {
            assert_eq!(out.value(1, column), Some(&Value::Null));
        }
    }

    #[test]
    fn test_missing_period_column_is_skipped() {
        let records = RecordSet::new(vec!["pays".into()], vec![vec!["Mali".into()]]);
        let roles = ColumnRoles::classify(&records.columns);
        let mut log = CleaningLog::new();

        let out = PeriodParser.apply(records.clone(), &roles, &mut log);

        assert_eq!(out, records);
        assert_eq!(log.skipped.len(), 1);
    }
}
