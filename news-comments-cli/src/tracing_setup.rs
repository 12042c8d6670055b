//! Tracing setup for the news-comments binary
//!
//! Usage:
//!   news-comments --debug serve              # Debug logging to console
//!   RUST_LOG=news_comments_server=debug ...  # Fine-grained log control
//!
//! `RUST_LOG` always wins over the configured `[log] level`.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
    /// Force debug level and show targets
    pub debug: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug: false,
        }
    }
}

impl TracingConfig {
    fn filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        let directive = if self.debug { "debug" } else { self.level.as_str() };
        EnvFilter::try_new(directive).map_err(|e| anyhow!("invalid log level '{}': {}", directive, e))
    }
}

/// Initialize console tracing. Fails if a subscriber is already installed.
pub fn init(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(config.filter()?)
        .with_target(config.debug) // Show targets in debug mode
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
