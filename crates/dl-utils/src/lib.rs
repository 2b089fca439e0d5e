//! Shared calendar helpers and error types for Dialy.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use thiserror::Error;

/// Result type for shared helpers.
pub type UtilsResult<T> = Result<T, UtilsError>;

/// Shared error variants for cross-crate helpers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UtilsError {
    /// The input is not shaped like `YYYY-MM-DD`.
    #[error("invalid ISO date format: {0}")]
    Format(String),
    /// The input is shaped correctly but names no calendar day.
    #[error("invalid ISO date: {0}")]
    Date(String),
}

/// Format used for persisted calendar dates.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

const WEEKDAYS_JA: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

/// Truncate a local timestamp to its calendar day.
pub fn start_of_day(moment: NaiveDateTime) -> NaiveDate {
    moment.date()
}

/// True when `date` lies strictly after the calendar day of `today`.
pub fn is_future_date(date: NaiveDate, today: NaiveDate) -> bool {
    date > today
}

/// Render a date as zero-padded `YYYY-MM-DD`.
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` string into a local calendar date.
///
/// Only four-digit years and two-digit months and days are accepted; the
/// value is never routed through a time zone, so it cannot drift by a day.
pub fn parse_iso_date(value: &str) -> UtilsResult<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| index == 4 || index == 7 || byte.is_ascii_digit());
    if !shaped {
        return Err(UtilsError::Format(value.to_string()));
    }

    let year = value[0..4]
        .parse::<i32>()
        .map_err(|_| UtilsError::Format(value.to_string()))?;
    let month = value[5..7]
        .parse::<u32>()
        .map_err(|_| UtilsError::Format(value.to_string()))?;
    let day = value[8..10]
        .parse::<u32>()
        .map_err(|_| UtilsError::Format(value.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| UtilsError::Date(value.to_string()))
}

/// Japanese short weekday name, Sunday first.
pub fn weekday_ja(weekday: Weekday) -> &'static str {
    WEEKDAYS_JA[weekday.num_days_from_sunday() as usize]
}

/// Render a date as `2月8日（日）`.
pub fn format_date_with_weekday(date: NaiveDate) -> String {
    format!(
        "{}月{}日（{}）",
        date.month(),
        date.day(),
        weekday_ja(date.weekday())
    )
}

/// Move a date to `year`, keeping month and day.
///
/// February 29th clamps to February 28th when `year` is not a leap year.
pub fn with_year_clamped(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), date.day().min(28)))
}
