//! HTTP server command
//!
//! Startup: pool, store (fatal if unreachable), schema, router, listener.
//! Shutdown: stop the listener, then close the store's pool.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use news_comments_server::db::{create_pool, migrations};
use news_comments_server::http::{run_server, shutdown_signal, AppState};
use news_comments_server::{CommentStore, Config};

use super::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config file)
    #[arg(long, short = 'b', env = "NEWS_COMMENTS_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

impl ServeArgs {
    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.http.bind_addr = bind;
        }
        if self.cors_permissive {
            config.http.cors_permissive = true;
        }
        self.db.apply(config);
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut config: Config) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;

    tracing::info!("Starting news-comments on {}", config.http.bind_addr);
    tracing::info!(database = %config.postgres.redacted_uri(), "Connecting to PostgreSQL");

    let pool = create_pool(&config.postgres).context("Invalid PostgreSQL connection string")?;
    let store = CommentStore::new(pool, &config.store, tracing::info_span!("comments"))
        .await
        .context("Failed to connect to PostgreSQL")?;
    let store = Arc::new(store);

    if config.postgres.run_migrations {
        if let Err(e) = migrations::run(store.pool()).await {
            store.shutdown().await;
            return Err(e).context("Failed to apply comments schema");
        }
    }

    let state = AppState::new(store.clone());
    let served = run_server(state, &config.http, shutdown_signal()).await;
    if let Err(e) = &served {
        tracing::error!("http server error: {}", e);
    }

    store.shutdown().await;
    tracing::info!("server loop stopped");

    served.context("Server error")
}
