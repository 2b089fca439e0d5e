use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use dl_core::DEFAULT_LOOKBACK_YEARS;

use crate::{StoreError, StoreResult};

/// Directory name used for the store and the config folder.
pub const APP_DIR_NAME: &str = "dialy";

/// Environment variable overriding the store location.
pub const STORE_PATH_ENV: &str = "DIALY_PATH";

const CONFIG_FILE_NAME: &str = "config.yaml";

/// User settings read from `config.yaml`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DialyConfig {
    /// Store directory.
    #[serde(default)]
    pub path: Option<String>,
    /// Lookback for same-date queries.
    #[serde(default)]
    pub lookback_years: Option<u32>,
}

impl DialyConfig {
    /// Configured lookback, or the default of five years.
    pub fn lookback_years(&self) -> u32 {
        self.lookback_years.unwrap_or(DEFAULT_LOOKBACK_YEARS)
    }
}

/// Resolve the default store path (~/.dialy).
pub fn default_store_path() -> StoreResult<PathBuf> {
    if let Some(dir) = dirs::home_dir() {
        return Ok(dir.join(format!(".{APP_DIR_NAME}")));
    }
    Err(StoreError::Location(
        "unable to determine a default store path".into(),
    ))
}

/// Location of `config.yaml` under the platform config directory.
pub fn config_path() -> StoreResult<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        return Ok(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    Err(StoreError::Location(
        "unable to determine config directory".into(),
    ))
}

/// Load the config from [`config_path`].
pub fn load_config() -> StoreResult<DialyConfig> {
    load_config_from(&config_path()?)
}

/// Load the config at `path`, defaulting every field when the file is missing.
pub fn load_config_from(path: &Path) -> StoreResult<DialyConfig> {
    if !path.exists() {
        return Ok(DialyConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|err| StoreError::Serialization(err.to_string()))
}

/// Write `config` to `path`, creating parent directories.
pub fn save_config_to(path: &Path, config: &DialyConfig) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents =
        serde_yaml::to_string(config).map_err(|err| StoreError::Serialization(err.to_string()))?;
    fs::write(path, contents)?;
    Ok(())
}

/// Pick the store path from an env override, then the config, then the default.
pub fn resolve_store_path_with(
    env_value: Option<String>,
    config: &DialyConfig,
) -> StoreResult<PathBuf> {
    if let Some(value) = env_value {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }

    if let Some(path) = &config.path {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    default_store_path()
}

/// Resolve the store path using the `DIALY_PATH` environment variable.
pub fn resolve_store_path(config: &DialyConfig) -> StoreResult<PathBuf> {
    resolve_store_path_with(std::env::var(STORE_PATH_ENV).ok(), config)
}
