//! CLI command implementations

pub mod catalog;
pub mod init;
pub mod recommend;
pub mod state;
pub mod wallet;
pub mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use neurobreath_rewards::config::Config;
use neurobreath_rewards::storage::FileStorage;
use neurobreath_rewards::{RewardsEngine, parse_timezone};

/// Options shared by every command
pub struct CliContext {
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
}

impl CliContext {
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path.as_deref())
    }

    /// Open the file store and build an engine over it
    pub fn open_engine(&self) -> Result<(Config, RewardsEngine<FileStorage>)> {
        let config = self.load_config()?;
        let dir = self.data_dir.clone().unwrap_or_else(|| config.data_dir());
        let storage = FileStorage::open(&dir)
            .with_context(|| format!("Failed to open store: {}", dir.display()))?;

        let engine = RewardsEngine::new(storage, config.store_keys())
            .with_timezone(parse_timezone(&config.clock.timezone));
        Ok((config, engine))
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
