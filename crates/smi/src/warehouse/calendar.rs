//! Date-dimension rows.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::transform::CalendarFields;

const MONTH_NAMES: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

/// Integer key `YYYYMMDD`.
pub fn date_key(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// All attributes stored for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRow {
    pub date_key: i64,
    pub date: NaiveDate,
    pub year: i32,
    pub quarter: u32,
    pub month: u32,
    /// ISO week number.
    pub week: u32,
    pub day: u32,
    pub semester: u32,
    pub month_name: String,
    pub is_month_start: bool,
    pub is_month_end: bool,
}

impl DateRow {
    pub fn from_date(date: NaiveDate) -> Self {
        let cal = CalendarFields::from_date(date);
        let is_month_end = date.succ_opt().is_none_or(|next| next.month() != date.month());

        Self {
            date_key: date_key(date),
            date,
            year: cal.year,
            quarter: cal.quarter,
            month: cal.month,
            week: date.iso_week().week(),
            day: date.day(),
            semester: cal.semester,
            month_name: MONTH_NAMES[date.month0() as usize].to_string(),
            is_month_start: date.day() == 1,
            is_month_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_of_month() {
        let row = DateRow::from_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        assert_eq!(row.date_key, 20250101);
        assert_eq!(row.month_name, "Janvier");
        assert_eq!(row.week, 1);
        assert_eq!(row.semester, 1);
        assert!(row.is_month_start);
        assert!(!row.is_month_end);
    }

    #[test]
    fn test_month_end() {
        let row = DateRow::from_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(row.is_month_end);
        assert_eq!(row.quarter, 1);
    }
}
