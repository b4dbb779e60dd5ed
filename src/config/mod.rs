//! Configuration loading and management

mod io;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rewards::{DEFAULT_TIMEZONE, StoreKeys};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where the stores live and which keys they use
    #[serde(default)]
    pub storage: StorageSettings,

    /// Day-key settings
    #[serde(default)]
    pub clock: ClockSettings,

    /// External change detection
    #[serde(default)]
    pub watch: WatchSettings,
}

/// Store location and keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Store directory; `~/` is expanded. Defaults to `~/.neurobreath/store`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,

    #[serde(default = "default_wallet_key")]
    pub wallet_key: String,

    #[serde(default = "default_progress_key")]
    pub progress_key: String,

    #[serde(default = "default_challenge_key")]
    pub challenge_key: String,
}

/// Timezone used for "today" buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSettings {
    /// IANA timezone name; unknown names fall back to the local date
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Store watcher settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Debounce window for file change events
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_wallet_key() -> String {
    StoreKeys::default().wallet
}

fn default_progress_key() -> String {
    StoreKeys::default().progress
}

fn default_challenge_key() -> String {
    StoreKeys::default().challenge
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_debounce_ms() -> u64 {
    250
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            wallet_key: default_wallet_key(),
            progress_key: default_progress_key(),
            challenge_key: default_challenge_key(),
        }
    }
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Config {
    /// Store keys as the engine expects them
    pub fn store_keys(&self) -> StoreKeys {
        StoreKeys {
            wallet: self.storage.wallet_key.clone(),
            progress: self.storage.progress_key.clone(),
            challenge: self.storage.challenge_key.clone(),
        }
    }

    /// Resolved store directory
    pub fn data_dir(&self) -> PathBuf {
        match &self.storage.data_dir {
            Some(dir) => expand_home(dir),
            None => Self::global_config_dir().join("store"),
        }
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => Path::new(path).to_path_buf(),
    }
}
