//! Schema migration command

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use news_comments_server::db::{create_pool, migrations};
use news_comments_server::Config;

use super::DatabaseArgs;

/// Upper bound for applying the whole schema, connect included
const MIGRATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

pub async fn run_migrate(args: MigrateArgs, mut config: Config) -> Result<()> {
    args.db.apply(&mut config);
    config.validate()?;

    let pool = create_pool(&config.postgres).context("Invalid PostgreSQL connection string")?;
    let result = tokio::time::timeout(MIGRATION_TIMEOUT, migrations::run(&pool)).await;
    pool.close().await;

    result
        .context("Timed out applying comments schema")?
        .context("Failed to apply comments schema")?;
    println!("comments schema is up to date");
    Ok(())
}
