use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod context;
mod logging;
mod render;

use context::AppContext;

#[derive(Parser)]
#[command(name = "kiosk")]
#[command(about = "Kiosk - storefront chat assistant and cart", long_about = None)]
struct Cli {
    /// Path to config.toml (default: ~/.config/kiosk/config.toml)
    #[arg(long, global = true, env = "KIOSK_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for persisted state (overrides [storage] data_dir)
    #[arg(long, global = true, env = "KIOSK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Keep state in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Mirror logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant in an interactive session
    Chat,
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Completion API utilities
    Api {
        #[command(subcommand)]
        action: ApiAction,
    },
}

#[derive(Subcommand)]
enum ApiAction {
    /// Check that the API accepts the configured key
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = context::resolve_config_path(cli.config)?;
    let _log_guard = logging::init(&config_path, cli.verbose)?;

    let ctx = AppContext::load(config_path, cli.data_dir, cli.ephemeral)?;
    tracing::debug!("[Main] Storage: {}", ctx.storage_description());

    match cli.command {
        Commands::Chat => commands::chat::run(&ctx).await?,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await?,
        Commands::Api { action } => match action {
            ApiAction::Check => commands::api::check(&ctx).await?,
        },
    }

    Ok(())
}
