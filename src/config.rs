//! Configuration primitives for the creator draft pipeline.
//!
//! Stored in a machine-readable TOML file located at
//! `<workspace>/config/drafts.toml`, where the workspace root is
//! `$CREATORDRAFT_HOME` or the OS data directory (`CreatorDraft`).
//!
//! A missing file yields defaults so a fresh install can start editing
//! without any setup.

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Standard file name of the draft configuration.
pub const CONFIG_FILE_NAME: &str = "drafts.toml";

/// Environment variable overriding the workspace root.
pub const HOME_ENV_VAR: &str = "CREATORDRAFT_HOME";

/// Root configuration persisted per installation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DraftConfig {
    /// Local cache behaviour (debounce window, directory override).
    #[serde(default)]
    pub cache: CacheSettings,
    /// Remote synchronisation knobs.
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Settings for the local draft cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Quiet period (ms) after the last edit before the cache is written.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Optional directory override; defaults to `<workspace>/cache/drafts`.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            directory: None,
        }
    }
}

const MAX_DEBOUNCE_MS: u64 = 60_000;

const fn default_debounce_ms() -> u64 {
    750
}

/// Settings for talking to the remote draft service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Re-submit sections flagged by reconciliation as soon as a session starts.
    #[serde(default = "default_resubmit_on_start")]
    pub resubmit_on_start: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            resubmit_on_start: default_resubmit_on_start(),
        }
    }
}

const fn default_resubmit_on_start() -> bool {
    true
}

impl DraftConfig {
    /// Debounce window as a chrono duration, capped at one minute.
    pub fn debounce(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.cache.debounce_ms.min(MAX_DEBOUNCE_MS) as i64)
    }

    /// Directory holding one cache entry per owner.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(workspace_root()?.join("cache").join("drafts")),
        }
    }
}

/// Returns the root directory where draft data is stored.
///
/// Order of precedence:
/// 1. `CREATORDRAFT_HOME` environment variable.
/// 2. OS-specific data directory via `directories::BaseDirs`.
pub fn workspace_root() -> Result<PathBuf> {
    if let Ok(path) = env::var(HOME_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().context("Unable to determine OS data directory")?;
    Ok(base_dirs.data_dir().join("CreatorDraft"))
}

/// Path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(workspace_root()?.join("config").join(CONFIG_FILE_NAME))
}

/// Loads the configuration from disk or returns defaults.
pub fn load_or_default() -> Result<DraftConfig> {
    let path = config_file_path()?;
    if !path.exists() {
        return Ok(DraftConfig::default());
    }
    let data = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    let cfg: DraftConfig =
        toml::from_str(&data).with_context(|| format!("Failed to parse config file {:?}", path))?;
    Ok(cfg)
}

/// Persists the configuration to disk.
pub fn save(config: &DraftConfig) -> Result<()> {
    let path = config_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating config directory {:?}", parent))?;
    }
    let data = toml::to_string_pretty(config)?;
    fs::write(&path, data).with_context(|| format!("Failed writing config file {:?}", path))?;
    Ok(())
}
