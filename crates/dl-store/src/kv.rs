use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use dl_core::DiaryError;

/// Result type for key-value slot operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by key-value stores and configuration loading.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An IO error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The key cannot be mapped onto a slot.
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// No default location could be determined.
    #[error("{0}")]
    Location(String),
}

impl From<StoreError> for DiaryError {
    fn from(err: StoreError) -> Self {
        DiaryError::storage(err.to_string()).with_cause(err)
    }
}

/// A durable string slot per key.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    /// Replace the value stored under `key`.
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Drop the value stored under `key`, if any.
    fn remove_item(&self, key: &str) -> StoreResult<()>;
}

/// In-process store. Clones share the same slots.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.slots().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.slots().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.slots().remove(key);
        Ok(())
    }
}

/// Filesystem store holding one `<key>.json` file per slot under a root.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// A store keeping its slots under `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Directory holding the slot files.
    pub fn path(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.root)?;
        // Write beside the slot and rename so readers never see half a value.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        let path = self.slot_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_clones_share_slots() {
        let store = MemoryStore::new();
        let view = store.clone();
        store.set_item("k", "v").unwrap();
        assert_eq!(view.get_item("k").unwrap().as_deref(), Some("v"));
        view.remove_item("k").unwrap();
        assert!(store.get_item("k").unwrap().is_none());
    }

    #[test]
    fn file_store_round_trip_and_reopen() {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path().join("nested");
        let store = FileStore::new(root.clone());

        assert!(store.get_item("slot").unwrap().is_none());
        store.set_item("slot", "first").unwrap();
        store.set_item("slot", "second").unwrap();

        let reopened = FileStore::new(root.clone());
        assert_eq!(reopened.path(), root.as_path());
        assert_eq!(reopened.get_item("slot").unwrap().as_deref(), Some("second"));
        assert!(root.join("slot.json").exists());
        assert!(!root.join("slot.json.tmp").exists());

        reopened.remove_item("slot").unwrap();
        reopened.remove_item("slot").unwrap();
        assert!(store.get_item("slot").unwrap().is_none());
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let temp = TempDir::new().expect("temp dir");
        let store = FileStore::new(temp.path().to_path_buf());
        assert!(matches!(
            store.set_item("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get_item(""), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn store_errors_become_storage_errors() {
        let err: DiaryError = StoreError::InvalidKey("x".into()).into();
        assert!(matches!(err, DiaryError::Storage { .. }));
    }
}
