//! bta-server - Bundestag session-agenda API service
//!
//! Scrapes the parliament's conference-week pages, keeps the parsed
//! agenda in a partitioned key-value store and serves it as an iCal
//! feed, JSON, XML and CSV with response caching. The current week is
//! refreshed on a fixed interval in the background.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bta_server::cache::{EdgeCache, SqliteEdgeCache};
use bta_server::config::ServerConfig;
use bta_server::fetch::{AgendaFetcher, HttpAgendaFetcher};
use bta_server::store::{init_database_pool, KvStore, SqliteKvStore};
use bta_server::{build_router, scheduler, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bta_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(ServerConfig::parse());

    info!("Starting bta-server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.database.display());
    info!("Upstream: {}", config.upstream_url);

    let pool = init_database_pool(&config.database)
        .await
        .context("Failed to open database")?;

    let store: Arc<dyn KvStore> = Arc::new(
        SqliteKvStore::new(pool.clone())
            .await
            .context("Failed to initialize key-value store")?,
    );
    let edge_cache: Arc<dyn EdgeCache> = Arc::new(
        SqliteEdgeCache::new(pool)
            .await
            .context("Failed to initialize response cache")?,
    );
    let fetcher: Arc<dyn AgendaFetcher> =
        Arc::new(HttpAgendaFetcher::new(config.upstream_url.clone()));

    let state = AppState::new(config.clone(), store, fetcher, edge_cache);

    scheduler::spawn_refresh_task(
        state.service.clone(),
        Duration::from_secs(config.refresh_interval),
    );
    info!(
        "Scheduled refresh every {} seconds",
        config.refresh_interval
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
