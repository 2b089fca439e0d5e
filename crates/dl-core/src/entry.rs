use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

use dl_utils::is_future_date;

use crate::{Clock, DateValue, DiaryError, DiaryResult};

/// Maximum content length, counted in UTF-16 code units.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Preview length used when callers have no preference.
pub const DEFAULT_PREVIEW_LENGTH: usize = 100;

const ELLIPSIS: &str = "...";

/// Content length in UTF-16 code units, the unit the stored format counts in.
pub fn content_length(content: &str) -> usize {
    content.encode_utf16().count()
}

/// One diary record for one calendar date.
///
/// Entries are immutable. [`DiaryEntry::update`] returns a new value and
/// leaves the original untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiaryEntry {
    id: Uuid,
    date: NaiveDate,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DiaryEntry {
    /// Create a new entry with a fresh id and both timestamps set to now.
    pub fn create(
        date: NaiveDate,
        content: impl Into<String>,
        clock: &dyn Clock,
    ) -> DiaryResult<Self> {
        let now = clock.now();
        Self::validated(Uuid::new_v4(), date, content.into(), now, now, clock)
    }

    /// Restore an entry from persisted fields, re-checking every invariant.
    pub fn reconstruct(
        id: Uuid,
        date: NaiveDate,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        clock: &dyn Clock,
    ) -> DiaryResult<Self> {
        Self::validated(id, date, content.into(), created_at, updated_at, clock)
    }

    /// Return a copy with new content and a refreshed `updated_at`.
    pub fn update(&self, new_content: impl Into<String>, clock: &dyn Clock) -> DiaryResult<Self> {
        let content = new_content.into();
        check_content(&content)?;
        Ok(Self {
            id: self.id,
            date: self.date,
            content,
            created_at: self.created_at,
            updated_at: clock.now(),
        })
    }

    fn validated(
        id: Uuid,
        date: NaiveDate,
        content: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        clock: &dyn Clock,
    ) -> DiaryResult<Self> {
        if id.is_nil() {
            return Err(DiaryError::validation("ID is required"));
        }
        if is_future_date(date, clock.today()) {
            return Err(DiaryError::future_date());
        }
        check_content(&content)?;
        Ok(Self {
            id,
            date,
            content,
            created_at,
            updated_at,
        })
    }

    /// Identity assigned at creation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Calendar day the entry belongs to.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The entry date as a [`DateValue`].
    pub fn date_value(&self) -> DateValue {
        DateValue::new(self.date)
    }

    /// Body text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// When the entry was first saved.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the content last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when the entry belongs to `date`.
    pub fn is_same_date(&self, date: NaiveDate) -> bool {
        self.date == date
    }

    /// Year of the entry date.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Content length in UTF-16 code units.
    pub fn character_count(&self) -> usize {
        content_length(&self.content)
    }

    /// Content cut to at most `max_length` units, with `...` appended when
    /// anything was cut. Characters are never split.
    pub fn preview_text(&self, max_length: usize) -> String {
        if self.character_count() <= max_length {
            return self.content.clone();
        }

        let mut used = 0;
        let mut preview: String = self
            .content
            .chars()
            .take_while(|ch| {
                used += ch.len_utf16();
                used <= max_length
            })
            .collect();
        preview.push_str(ELLIPSIS);
        preview
    }
}

fn check_content(content: &str) -> DiaryResult<()> {
    if content_length(content) > MAX_CONTENT_LENGTH {
        return Err(DiaryError::content_too_long());
    }
    Ok(())
}
