use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "nbrewards")]
#[command(about = "NeuroBreath rewards - points, badges and coupons from local practice")]
#[command(version)]
struct Cli {
    /// Store directory (overrides the config file)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Path to the config file (defaults to ~/.neurobreath/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show points, badges, coupons and tokens
    State,

    /// Spend points on a coupon
    Redeem {
        /// Coupon id (see `nbrewards catalog`)
        coupon: String,
    },

    /// Use one token from the wallet
    UseToken {
        /// Token id, e.g. streak-pause
        token: String,
    },

    /// Suggest what to practise next
    Recommend,

    /// List every badge and coupon definition
    Catalog,

    /// Watch the store and print a state update on every external change
    Watch,

    /// Initialize a new config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so JSON output stays clean)
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = cli::CliContext {
        config_path: cli.config,
        data_dir: cli.data_dir,
        json: cli.json,
    };

    match cli.command {
        Some(Commands::State) | None => cli::state::state_command(&ctx)?,
        Some(Commands::Redeem { coupon }) => cli::wallet::redeem_command(&ctx, &coupon)?,
        Some(Commands::UseToken { token }) => cli::wallet::use_token_command(&ctx, &token)?,
        Some(Commands::Recommend) => cli::recommend::recommend_command(&ctx)?,
        Some(Commands::Catalog) => cli::catalog::catalog_command(&ctx)?,
        Some(Commands::Watch) => cli::watch::watch_command(&ctx)?,
        Some(Commands::Init { force }) => cli::init::init_command(&ctx, force)?,
    }

    Ok(())
}
