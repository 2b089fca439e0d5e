use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dl_core::{Clock, DiaryEntry, DiaryError, DiaryResult};
use dl_utils::{parse_iso_date, to_iso_date};

/// Key of the single slot holding the document.
pub const STORAGE_KEY: &str = "dialy_entries";
/// Schema version written by this build.
pub const STORAGE_VERSION: &str = "1.0.0";

/// The persisted aggregate holding every entry.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DiaryStorage {
    pub version: String,
    pub entries: Vec<StoredDiaryEntry>,
}

impl DiaryStorage {
    /// An empty document at the current version.
    pub fn empty() -> Self {
        Self {
            version: STORAGE_VERSION.to_string(),
            entries: Vec::new(),
        }
    }

    /// Parse a raw slot value. Malformed or wrongly shaped input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(storage) => Some(storage),
            Err(err) => {
                log::warn!("discarding unreadable diary document: {err}");
                None
            }
        }
    }

    /// Serialize the whole document.
    pub fn to_json(&self) -> DiaryResult<String> {
        serde_json::to_string(self)
            .map_err(|err| DiaryError::storage(err.to_string()).with_cause(err))
    }
}

/// One entry as it sits in the document.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredDiaryEntry {
    pub id: String,
    pub date: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl StoredDiaryEntry {
    /// True when this record carries `id`, whatever the letter case.
    pub fn has_id(&self, id: Uuid) -> bool {
        Uuid::try_parse(&self.id).is_ok_and(|stored| stored == id)
    }

    /// Rebuild the domain entry, re-checking its invariants.
    pub fn to_entry(&self, clock: &dyn Clock) -> DiaryResult<DiaryEntry> {
        let id = Uuid::try_parse(&self.id).map_err(|err| {
            DiaryError::validation(format!("Invalid ID: {}", self.id)).with_cause(err)
        })?;
        let date = parse_iso_date(&self.date).map_err(|err| {
            DiaryError::validation(format!("Invalid date: {err}")).with_cause(err)
        })?;
        let created_at = parse_timestamp(&self.created_at, "createdAt")?;
        let updated_at = parse_timestamp(&self.updated_at, "updatedAt")?;
        DiaryEntry::reconstruct(id, date, self.content.clone(), created_at, updated_at, clock)
    }
}

impl From<&DiaryEntry> for StoredDiaryEntry {
    fn from(entry: &DiaryEntry) -> Self {
        Self {
            id: entry.id().to_string(),
            date: to_iso_date(entry.date()),
            content: entry.content().to_string(),
            created_at: format_timestamp(entry.created_at()),
            updated_at: format_timestamp(entry.updated_at()),
        }
    }
}

/// RFC 3339 in UTC with millisecond precision, e.g. `2026-02-08T00:00:00.000Z`.
pub fn format_timestamp(moment: DateTime<Utc>) -> String {
    moment.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(value: &str, field: &str) -> DiaryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|moment| moment.with_timezone(&Utc))
        .map_err(|err| DiaryError::validation(format!("Invalid {field}")).with_cause(err))
}
