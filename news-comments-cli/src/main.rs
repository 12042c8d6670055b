//! news-comments - threaded comment service for news items
//!
//! Subcommands:
//! - `serve`: run the HTTP API until a shutdown signal arrives
//! - `migrate`: create the comments schema and exit
//! - `check-config`: print the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use news_comments_server::Config;

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "news-comments",
    author,
    version,
    about = "Store and list threaded comments for news items"
)]
struct Cli {
    /// Config file (default: ~/.news-comments/config.toml when present)
    #[arg(long, short = 'c', global = true, env = "NEWS_COMMENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "warn,news_comments_server=debug"
    #[arg(long, global = true, env = "NEWS_COMMENTS_LOG")]
    log_level: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Apply the comments schema and exit
    Migrate(commands::migrate::MigrateArgs),
    /// Print the effective configuration (password redacted)
    CheckConfig(commands::check_config::CheckConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }

    tracing_setup::init(&TracingConfig {
        level: config.log.level.clone(),
        debug: cli.debug,
    })?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await?,
        Commands::Migrate(args) => commands::run_migrate(args, config).await?,
        Commands::CheckConfig(args) => commands::run_check_config(args, config)?,
    }
    Ok(())
}
