//! Application use cases wrapping the diary repository.
//!
//! Input is validated before any I/O. Validation errors pass through as-is;
//! repository failures are wrapped into save or fetch failures that keep the
//! original error as their cause.

use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;

use dl_core::validation::{
    CreateDiaryEntryInput, CreateDiaryEntrySchema, DeleteDiaryEntryInput, DeleteDiaryEntrySchema,
    DiaryDateSchema, GetEntriesBySameDateInput, GetEntriesBySameDateSchema, Schema,
    UpdateDiaryEntryInput, UpdateDiaryEntrySchema,
};
use dl_core::{Clock, DiaryEntry, DiaryError, DiaryRepository, DiaryResult, SystemClock};

const SAVE_FAILED: &str = "Failed to save diary entry";
const DELETE_FAILED: &str = "Failed to delete diary entry";
const LOAD_ONE_FAILED: &str = "Failed to load diary entry";
const LOAD_MANY_FAILED: &str = "Failed to load diary entries";
const NOT_FOUND: &str = "Diary entry not found";

/// Dependencies shared by every use case.
#[derive(Clone)]
pub struct Diary {
    repository: Arc<dyn DiaryRepository>,
    clock: Arc<dyn Clock>,
}

impl Diary {
    /// Use cases over `repository` with the system clock.
    pub fn new(repository: Arc<dyn DiaryRepository>) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }

    /// Use cases over `repository` reading time from `clock`.
    pub fn with_clock(repository: Arc<dyn DiaryRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// See [`CreateDiaryEntry`].
    pub fn create_entry(&self) -> CreateDiaryEntry {
        CreateDiaryEntry { diary: self.clone() }
    }

    /// See [`UpdateDiaryEntry`].
    pub fn update_entry(&self) -> UpdateDiaryEntry {
        UpdateDiaryEntry { diary: self.clone() }
    }

    /// See [`DeleteDiaryEntry`].
    pub fn delete_entry(&self) -> DeleteDiaryEntry {
        DeleteDiaryEntry { diary: self.clone() }
    }

    /// See [`GetDiaryEntry`].
    pub fn get_entry(&self) -> GetDiaryEntry {
        GetDiaryEntry { diary: self.clone() }
    }

    /// See [`GetEntriesBySameDate`].
    pub fn get_entries_by_same_date(&self) -> GetEntriesBySameDate {
        GetEntriesBySameDate { diary: self.clone() }
    }

    /// Every entry, newest first.
    pub async fn all_entries(&self) -> DiaryResult<Vec<DiaryEntry>> {
        self.repository
            .find_all()
            .await
            .map_err(|err| DiaryError::fetch_failed(LOAD_MANY_FAILED, err))
    }

    /// The current local calendar day.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

/// Creates the entry for a date that has none yet.
pub struct CreateDiaryEntry {
    diary: Diary,
}

impl CreateDiaryEntry {
    /// Validate, reject an occupied date, then save a new entry.
    pub async fn execute(&self, input: CreateDiaryEntryInput) -> DiaryResult<DiaryEntry> {
        let validated = CreateDiaryEntrySchema.parse(input, self.diary.clock())?;

        let existing = self
            .diary
            .repository
            .find_by_date(validated.date)
            .await
            .map_err(|err| DiaryError::fetch_failed(LOAD_ONE_FAILED, err))?;
        if existing.is_some() {
            return Err(DiaryError::duplicate_date());
        }

        let entry = DiaryEntry::create(validated.date, validated.content, self.diary.clock())?;
        self.diary
            .repository
            .save(&entry)
            .await
            .map_err(wrap_save_failure)?;
        debug!("created diary entry {} for {}", entry.id(), entry.date());
        Ok(entry)
    }
}

/// Replaces the content of an existing entry.
pub struct UpdateDiaryEntry {
    diary: Diary,
}

impl UpdateDiaryEntry {
    /// Validate, load the entry by id, then save the updated copy.
    pub async fn execute(&self, input: UpdateDiaryEntryInput) -> DiaryResult<DiaryEntry> {
        let validated = UpdateDiaryEntrySchema.parse(input, self.diary.clock())?;

        let existing = self
            .diary
            .repository
            .find_by_id(validated.id)
            .await
            .map_err(|err| DiaryError::fetch_failed(LOAD_ONE_FAILED, err))?
            .ok_or_else(|| DiaryError::not_found(NOT_FOUND))?;

        let updated = existing.update(validated.content, self.diary.clock())?;
        self.diary
            .repository
            .save(&updated)
            .await
            .map_err(wrap_save_failure)?;
        debug!("updated diary entry {}", updated.id());
        Ok(updated)
    }
}

/// Removes an entry by id.
pub struct DeleteDiaryEntry {
    diary: Diary,
}

impl DeleteDiaryEntry {
    /// Validate the id and delete. Unknown ids are not an error.
    pub async fn execute(&self, input: DeleteDiaryEntryInput) -> DiaryResult<()> {
        let id = DeleteDiaryEntrySchema.parse(input, self.diary.clock())?;
        self.diary
            .repository
            .delete(id)
            .await
            .map_err(|err| DiaryError::save_failed(DELETE_FAILED, err))?;
        debug!("deleted diary entry {id}");
        Ok(())
    }
}

/// Looks up the entry written for a date.
pub struct GetDiaryEntry {
    diary: Diary,
}

impl GetDiaryEntry {
    /// The entry for `date`, which must not be in the future.
    pub async fn execute(&self, date: NaiveDate) -> DiaryResult<Option<DiaryEntry>> {
        let date = DiaryDateSchema.parse(date, self.diary.clock())?;
        self.diary
            .repository
            .find_by_date(date)
            .await
            .map_err(|err| DiaryError::fetch_failed(LOAD_ONE_FAILED, err))
    }
}

/// Entries from previous years sharing a date's month and day.
pub struct GetEntriesBySameDate {
    diary: Diary,
}

impl GetEntriesBySameDate {
    /// `years` defaults to five when `None`; it must lie in `1..=50`.
    /// Month and day match exactly, so February 29th finds only leap days.
    pub async fn execute(
        &self,
        date: NaiveDate,
        years: Option<i64>,
    ) -> DiaryResult<Vec<DiaryEntry>> {
        let query = GetEntriesBySameDateSchema
            .parse(GetEntriesBySameDateInput { date, years }, self.diary.clock())?;
        self.diary
            .repository
            .find_by_same_date(query.date, query.years)
            .await
            .map_err(|err| DiaryError::fetch_failed(LOAD_MANY_FAILED, err))
    }
}

/// Duplicate-date rejections from the repository pass through unwrapped.
fn wrap_save_failure(err: DiaryError) -> DiaryError {
    match err {
        DiaryError::DuplicateDateEntry { .. } => err,
        other => DiaryError::save_failed(SAVE_FAILED, other),
    }
}
