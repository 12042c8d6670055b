//! Print the effective configuration

use anyhow::{Context, Result};
use clap::Parser;
use news_comments_server::Config;

use super::DatabaseArgs;

#[derive(Parser, Debug)]
pub struct CheckConfigArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

pub fn run_check_config(args: CheckConfigArgs, mut config: Config) -> Result<()> {
    args.db.apply(&mut config);
    config.validate()?;

    config.postgres.uri = config.postgres.redacted_uri();
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
