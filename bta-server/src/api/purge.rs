//! Maintenance endpoint
//!
//! Clears cached responses and/or the whole agenda store. Both actions
//! are gated by deployment flags; with neither flag set the endpoint
//! just redirects to the documentation page.

use crate::error::{ApiError, ApiResult};
use crate::store::{KvStore, PARTITION_PREFIX};
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::info;

pub fn purge_routes() -> Router<AppState> {
    Router::new().route("/purge", get(purge))
}

async fn purge(State(state): State<AppState>) -> ApiResult<Response> {
    if !state.config.purge_cache && !state.config.purge_store {
        return Ok(Redirect::to("/").into_response());
    }

    let mut summary = Vec::new();

    if state.config.purge_cache {
        let removed = state.cache.purge_all().await.map_err(ApiError::from)?;
        info!(removed, "purged cached responses");
        summary.push(format!("{removed} cached responses removed"));
    }

    if state.config.purge_store {
        let keys = state
            .store
            .list(PARTITION_PREFIX)
            .await
            .map_err(ApiError::from)?;
        for key in &keys {
            state.store.delete(key).await.map_err(ApiError::from)?;
        }
        info!(removed = keys.len(), "purged agenda partitions");
        summary.push(format!("{} partitions removed", keys.len()));
    }

    Ok(summary.join(", ").into_response())
}
