use std::fmt;

use chrono::{Datelike, NaiveDate};

use dl_utils::{format_date_with_weekday, parse_iso_date, to_iso_date, with_year_clamped};

use crate::{Clock, DiaryError, DiaryResult};

/// A calendar date with no time-of-day or zone attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateValue(NaiveDate);

impl DateValue {
    /// Wrap an existing date.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from year, month, and day, rejecting days that do not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> DiaryResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| DiaryError::validation("Invalid date"))
    }

    /// Parse a `YYYY-MM-DD` string.
    pub fn parse_iso(value: &str) -> DiaryResult<Self> {
        parse_iso_date(value).map(Self).map_err(|err| {
            DiaryError::validation(format!("Invalid date: {err}")).with_cause(err)
        })
    }

    /// The current local day according to `clock`.
    pub fn today(clock: &dyn Clock) -> Self {
        Self(clock.today())
    }

    /// The wrapped date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// True when month and day match, whatever the year.
    pub fn is_same_month_and_day(&self, other: &DateValue) -> bool {
        self.0.month() == other.0.month() && self.0.day() == other.0.day()
    }

    /// The same month and day in each of the previous `years` years, most
    /// recent first. February 29th lands on February 28th in common years.
    pub fn same_dates_in_past_years(&self, years: u32) -> Vec<DateValue> {
        let current_year = self.0.year();
        (1..=years)
            .filter_map(|back| {
                let year = current_year.checked_sub(i32::try_from(back).ok()?)?;
                with_year_clamped(self.0, year).map(Self)
            })
            .collect()
    }

    /// Display form such as `2月8日（日）`.
    pub fn format_with_weekday(&self) -> String {
        format_date_with_weekday(self.0)
    }

    /// `YYYY-MM-DD` form, as persisted.
    pub fn format_iso(&self) -> String {
        to_iso_date(self.0)
    }
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_iso())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;

    fn value(iso: &str) -> DateValue {
        DateValue::parse_iso(iso).unwrap()
    }

    #[test]
    fn same_month_and_day_ignores_year() {
        let base = value("2026-02-08");
        assert!(base.is_same_month_and_day(&value("2024-02-08")));
        assert!(!base.is_same_month_and_day(&value("2024-02-07")));
        assert!(!base.is_same_month_and_day(&value("2026-03-08")));
    }

    #[test]
    fn past_years_descend_from_previous_year() {
        let dates: Vec<String> = value("2026-02-08")
            .same_dates_in_past_years(3)
            .iter()
            .map(DateValue::format_iso)
            .collect();
        assert_eq!(dates, ["2025-02-08", "2024-02-08", "2023-02-08"]);
    }

    #[test]
    fn zero_years_yields_nothing() {
        assert!(value("2026-02-08").same_dates_in_past_years(0).is_empty());
    }

    #[test]
    fn leap_day_projects_to_february_28th() {
        let dates: Vec<String> = value("2024-02-29")
            .same_dates_in_past_years(4)
            .iter()
            .map(DateValue::format_iso)
            .collect();
        let expected = ["2023-02-28", "2022-02-28", "2021-02-28", "2020-02-29"];
        assert_eq!(dates, expected);
    }

    #[test]
    fn formats_with_weekday_and_iso() {
        let date = value("2026-02-08");
        assert_eq!(date.format_with_weekday(), "2月8日（日）");
        assert_eq!(date.format_iso(), "2026-02-08");
        assert_eq!(date.to_string(), "2026-02-08");
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(matches!(
            DateValue::from_ymd(2023, 2, 29),
            Err(DiaryError::Validation { .. })
        ));
        assert!(matches!(
            DateValue::parse_iso("not-a-date"),
            Err(DiaryError::Validation { .. })
        ));
    }

    #[test]
    fn today_comes_from_the_clock() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        assert_eq!(DateValue::today(&FixedClock::on(date)).date(), date);
    }
}
