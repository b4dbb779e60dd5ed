//! Init command implementation

use anyhow::Result;

use neurobreath_rewards::config::Config;

use super::CliContext;

/// Write a default config file
pub fn init_command(ctx: &CliContext, force: bool) -> Result<()> {
    let path = ctx
        .config_path
        .clone()
        .unwrap_or_else(Config::global_config_path);

    let config = Config::init_file(&path, force)?;
    println!("Created {}", path.display());
    println!("Store directory: {}", config.data_dir().display());
    Ok(())
}
