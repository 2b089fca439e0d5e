use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use uuid::Uuid;

use dl_core::{
    Clock, DiaryEntry, DiaryError, DiaryRepository, DiaryResult, DiaryService, SystemClock,
};
use dl_utils::to_iso_date;

use crate::{
    DiaryStorage, KeyValueStore, StampVersion, StorageMigrator, StoredDiaryEntry, STORAGE_KEY,
    STORAGE_VERSION,
};

/// Diary repository keeping every entry in one versioned document under
/// [`STORAGE_KEY`] of a [`KeyValueStore`].
///
/// The last loaded or written document is cached per instance. Writes from
/// other instances or processes are only seen after
/// [`KvDiaryRepository::invalidate_cache`].
pub struct KvDiaryRepository {
    store: Arc<dyn KeyValueStore>,
    migrator: Box<dyn StorageMigrator>,
    clock: Arc<dyn Clock>,
    service: DiaryService,
    cache: Mutex<Option<DiaryStorage>>,
}

impl KvDiaryRepository {
    /// Repository over `store` with the system clock and the default migrator.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            migrator: Box::new(StampVersion),
            clock: Arc::new(SystemClock),
            service: DiaryService::new(),
            cache: Mutex::new(None),
        }
    }

    /// Replace the migration hook run on documents from older versions.
    #[must_use]
    pub fn with_migrator(mut self, migrator: impl StorageMigrator + 'static) -> Self {
        self.migrator = Box::new(migrator);
        self
    }

    /// Replace the clock used when re-validating stored entries.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Forget the cached document so the next read goes to the store.
    pub fn invalidate_cache(&self) {
        *self.cache() = None;
    }

    fn cache(&self) -> MutexGuard<'_, Option<DiaryStorage>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `read` against the current document, loading it first if needed.
    fn read<T>(&self, read: impl FnOnce(&DiaryStorage) -> DiaryResult<T>) -> DiaryResult<T> {
        let mut cache = self.cache();
        if cache.is_none() {
            *cache = Some(self.load()?);
        }
        read(cache.get_or_insert_with(DiaryStorage::empty))
    }

    /// Apply `change` to a copy of the document, persist the whole copy, and
    /// only then make it the cached snapshot.
    fn write(&self, change: impl FnOnce(&mut DiaryStorage) -> DiaryResult<()>) -> DiaryResult<()> {
        let mut cache = self.cache();
        let mut storage = match cache.take() {
            Some(storage) => storage,
            None => self.load()?,
        };
        let snapshot = storage.clone();

        if let Err(err) = change(&mut storage).and_then(|()| self.persist(&storage)) {
            *cache = Some(snapshot);
            return Err(err);
        }
        *cache = Some(storage);
        Ok(())
    }

    fn load(&self) -> DiaryResult<DiaryStorage> {
        let raw = self.store.get_item(STORAGE_KEY)?;
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            debug!("no diary document stored, starting empty");
            return Ok(DiaryStorage::empty());
        };

        let Some(storage) = DiaryStorage::parse(&raw) else {
            return Ok(DiaryStorage::empty());
        };
        if storage.version == STORAGE_VERSION {
            return Ok(storage);
        }

        let from = storage.version.clone();
        warn!("diary document version {from} differs from {STORAGE_VERSION}, migrating");
        let mut migrated = self.migrator.migrate(storage);
        migrated.version = STORAGE_VERSION.to_string();
        self.persist(&migrated)?;
        info!("migrated diary document from {from} to {STORAGE_VERSION}");
        Ok(migrated)
    }

    fn persist(&self, storage: &DiaryStorage) -> DiaryResult<()> {
        let json = storage.to_json()?;
        self.store.set_item(STORAGE_KEY, &json)?;
        debug!("persisted {} diary entries", storage.entries.len());
        Ok(())
    }

    fn decode_all(&self, storage: &DiaryStorage) -> DiaryResult<Vec<DiaryEntry>> {
        storage
            .entries
            .iter()
            .map(|stored| stored.to_entry(self.clock.as_ref()))
            .collect()
    }
}

#[async_trait]
impl DiaryRepository for KvDiaryRepository {
    async fn save(&self, entry: &DiaryEntry) -> DiaryResult<()> {
        let record = StoredDiaryEntry::from(entry);
        let id = entry.id();
        self.write(|storage| {
            let duplicate = storage
                .entries
                .iter()
                .any(|stored| stored.date == record.date && !stored.has_id(id));
            if duplicate {
                return Err(DiaryError::duplicate_date());
            }

            match storage.entries.iter_mut().find(|stored| stored.has_id(id)) {
                Some(existing) => *existing = record,
                None => storage.entries.push(record),
            }
            Ok(())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> DiaryResult<Option<DiaryEntry>> {
        self.read(|storage| {
            storage
                .entries
                .iter()
                .find(|stored| stored.has_id(id))
                .map(|stored| stored.to_entry(self.clock.as_ref()))
                .transpose()
        })
    }

    async fn find_by_date(&self, date: NaiveDate) -> DiaryResult<Option<DiaryEntry>> {
        let target = to_iso_date(date);
        self.read(|storage| {
            storage
                .entries
                .iter()
                .find(|stored| stored.date == target)
                .map(|stored| stored.to_entry(self.clock.as_ref()))
                .transpose()
        })
    }

    async fn find_by_same_date(
        &self,
        date: NaiveDate,
        years: u32,
    ) -> DiaryResult<Vec<DiaryEntry>> {
        let entries = self.read(|storage| self.decode_all(storage))?;
        Ok(self.service.entries_by_same_date(&entries, date, years))
    }

    async fn delete(&self, id: Uuid) -> DiaryResult<()> {
        self.write(|storage| {
            storage.entries.retain(|stored| !stored.has_id(id));
            Ok(())
        })
    }

    async fn find_all(&self) -> DiaryResult<Vec<DiaryEntry>> {
        let entries = self.read(|storage| self.decode_all(storage))?;
        Ok(self.service.sort_by_date_desc(entries))
    }
}
