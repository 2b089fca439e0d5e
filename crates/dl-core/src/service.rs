use chrono::{Datelike, NaiveDate};

use crate::DiaryEntry;

/// True when `candidate` shares month and day with `reference` and falls in
/// one of the `years` years before it. The reference year itself is excluded.
/// Matching is exact, so a February 29th reference only finds February 29th.
pub fn is_same_date_in_past_years(candidate: NaiveDate, reference: NaiveDate, years: u32) -> bool {
    let current_year = reference.year();
    let lookback = i32::try_from(years).unwrap_or(i32::MAX);
    let min_year = current_year.saturating_sub(lookback);
    let year = candidate.year();

    candidate.month() == reference.month()
        && candidate.day() == reference.day()
        && year < current_year
        && year >= min_year
}

/// Same-date selection over entries already in memory.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiaryService;

impl DiaryService {
    /// Create the service.
    pub fn new() -> Self {
        Self
    }

    /// Entries matching `date` from the previous `years` years, newest first.
    pub fn entries_by_same_date(
        &self,
        entries: &[DiaryEntry],
        date: NaiveDate,
        years: u32,
    ) -> Vec<DiaryEntry> {
        let matching: Vec<DiaryEntry> = entries
            .iter()
            .filter(|entry| is_same_date_in_past_years(entry.date(), date, years))
            .cloned()
            .collect();
        self.sort_by_date_desc(matching)
    }

    /// Stable sort, most recent date first.
    pub fn sort_by_date_desc(&self, mut entries: Vec<DiaryEntry>) -> Vec<DiaryEntry> {
        entries.sort_by(|left, right| right.date().cmp(&left.date()));
        entries
    }
}
