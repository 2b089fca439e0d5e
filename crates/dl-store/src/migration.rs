use crate::{DiaryStorage, STORAGE_VERSION};

/// Upgrades a document written by an older build to [`STORAGE_VERSION`].
pub trait StorageMigrator: Send + Sync {
    /// Transform `storage` into the current shape.
    ///
    /// The default carries the entries over untouched and stamps the
    /// current version.
    fn migrate(&self, storage: DiaryStorage) -> DiaryStorage {
        DiaryStorage {
            version: STORAGE_VERSION.to_string(),
            entries: storage.entries,
        }
    }
}

/// Migrator that only restamps the version.
#[derive(Clone, Copy, Debug, Default)]
pub struct StampVersion;

impl StorageMigrator for StampVersion {}
