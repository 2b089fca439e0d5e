//! Key-value backed persistence for Dialy.

mod config;
mod document;
mod kv;
mod migration;
mod repository;

pub use config::{
    config_path, default_store_path, load_config, load_config_from, resolve_store_path,
    resolve_store_path_with, save_config_to, DialyConfig, APP_DIR_NAME, STORE_PATH_ENV,
};
pub use document::{format_timestamp, DiaryStorage, StoredDiaryEntry, STORAGE_KEY, STORAGE_VERSION};
pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
pub use migration::{StampVersion, StorageMigrator};
pub use repository::KvDiaryRepository;
