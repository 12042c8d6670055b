pub mod check_config;
pub mod migrate;
pub mod serve;

pub use check_config::run_check_config;
pub use migrate::run_migrate;
pub use serve::run_serve;

use clap::Args;
use news_comments_server::Config;

/// Database options shared by commands that talk to PostgreSQL
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// Database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

impl DatabaseArgs {
    pub fn apply(self, config: &mut Config) {
        if let Some(url) = self.database_url {
            config.postgres.uri = url;
        }
    }
}
