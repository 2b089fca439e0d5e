use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{DiaryEntry, DiaryResult};

/// Lookback used by same-date queries when the caller gives none.
pub const DEFAULT_LOOKBACK_YEARS: u32 = 5;

/// Persistence capability for diary entries.
#[async_trait]
pub trait DiaryRepository: Send + Sync {
    /// Insert or replace an entry.
    ///
    /// Fails with [`crate::DiaryError::DuplicateDateEntry`] when a different
    /// entry already holds the same date.
    async fn save(&self, entry: &DiaryEntry) -> DiaryResult<()>;
    /// Fetch a single entry by id.
    async fn find_by_id(&self, id: Uuid) -> DiaryResult<Option<DiaryEntry>>;
    /// Fetch the entry written for `date`.
    async fn find_by_date(&self, date: NaiveDate) -> DiaryResult<Option<DiaryEntry>>;
    /// Entries sharing month and day with `date` from the previous `years`
    /// years, most recent first. A February 29th `date` matches only
    /// February 29th entries.
    async fn find_by_same_date(&self, date: NaiveDate, years: u32)
        -> DiaryResult<Vec<DiaryEntry>>;
    /// Remove an entry. Unknown ids are ignored.
    async fn delete(&self, id: Uuid) -> DiaryResult<()>;
    /// Every stored entry.
    async fn find_all(&self) -> DiaryResult<Vec<DiaryEntry>>;
}
