//! bta-server library interface
//!
//! The service wires an injected key-value store, response cache and
//! upstream fetcher into the agenda pipeline and exposes it over HTTP.
//! Everything is reachable from here so integration tests can build
//! the router against in-memory fakes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod planner;
pub mod reconcile;
pub mod render;
pub mod scheduler;
pub mod store;

pub use crate::error::{ApiError, ApiResult};

use crate::cache::{CacheCoordinator, EdgeCache};
use crate::config::ServerConfig;
use crate::fetch::AgendaFetcher;
use crate::planner::AgendaService;
use crate::store::KvStore;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn KvStore>,
    pub cache: Arc<CacheCoordinator>,
    pub service: Arc<AgendaService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: Arc<ServerConfig>,
        store: Arc<dyn KvStore>,
        fetcher: Arc<dyn AgendaFetcher>,
        edge_cache: Arc<dyn EdgeCache>,
    ) -> Self {
        let cache = Arc::new(CacheCoordinator::new(
            edge_cache,
            store.clone(),
            config.agenda_cache_ttl,
            config.list_cache_ttl,
        ));
        let service = Arc::new(AgendaService::new(store.clone(), fetcher, cache.clone()));

        Self {
            config,
            store,
            cache,
            service,
            startup_time: Utc::now(),
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::docs_routes())
        .merge(api::agenda_routes())
        .merge(api::data_list_routes())
        .merge(api::purge_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
