//! Configuration file I/O operations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::Config;
use crate::storage::write_atomic;

impl Config {
    /// Get the global config directory path (~/.neurobreath/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".neurobreath")
    }

    /// Get the global config file path (~/.neurobreath/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load `path` if given, else the global config, else defaults.
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let global_path = Self::global_config_path();
        if global_path.exists() {
            return Self::from_file(&global_path);
        }

        tracing::debug!("No config at {}, using defaults", global_path.display());
        Ok(Self::default())
    }

    /// Write a default config to `path`. Refuses to overwrite unless `force`.
    pub fn init_file(path: &Path, force: bool) -> Result<Self> {
        if path.exists() && !force {
            bail!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            );
        }

        write_config(path, DEFAULT_CONFIG)?;
        tracing::info!("Wrote default config to {}", path.display());
        Self::from_file(path)
    }
}

/// Default configuration content for `nbrewards init`
pub const DEFAULT_CONFIG: &str = r#"# NeuroBreath rewards configuration
# ==================================

# ============================================================================
# STORAGE - Where the JSON stores live
# ============================================================================
#
# Each key is stored as <data_dir>/<key>.json. The progress and challenge
# stores are only read; the wallet is read and written.

[storage]
# data_dir = "~/.neurobreath/store"
wallet_key = "nb.rewards.wallet.v1"
progress_key = "mpl.stats.v1"
challenge_key = "nb_challenge_stats_v1"

# ============================================================================
# CLOCK - Day boundaries for "today" minutes
# ============================================================================
#
# An unknown timezone falls back to the local date of this machine.

[clock]
timezone = "Europe/London"

# ============================================================================
# WATCH - External change detection for `nbrewards watch`
# ============================================================================

[watch]
debounce_ms = 250
"#;

/// Write `content` to `path`, creating the parent directory if needed
fn write_config(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    write_atomic(path, content.as_bytes())
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}
