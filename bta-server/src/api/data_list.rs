//! Data-list endpoint
//!
//! Enumerates which (year, week) partitions hold items, as a mapping
//! from year to its sorted week list. Years from the configured
//! minimum up to the current year are always present, possibly with an
//! empty list. Cached with the longer listing TTL.

use crate::cache::CachedResponse;
use crate::error::{ApiError, ApiResult};
use crate::store::{KvStore, PARTITION_PREFIX};
use crate::AppState;
use axum::{
    extract::{OriginalUri, State},
    response::Response,
    routing::get,
    Router,
};
use chrono::{Datelike, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

pub fn data_list_routes() -> Router<AppState> {
    Router::new().route("/data-list", get(data_list))
}

async fn data_list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Response> {
    let cache_key = uri.to_string();
    match state.cache.lookup(&cache_key).await {
        Ok(Some(hit)) => {
            return Ok(super::agenda::cached_response(
                hit,
                state.cache.list_ttl_secs(),
            ))
        }
        Ok(None) => {}
        Err(err) => warn!(%err, "response cache lookup failed, rendering fresh"),
    }

    let current_year = Utc::now().year();
    let mut listing: BTreeMap<i32, BTreeSet<u32>> = BTreeMap::new();
    for year in state.config.min_year..=current_year {
        listing.insert(year, BTreeSet::new());
    }

    for key in state.store.list(PARTITION_PREFIX).await.map_err(ApiError::from)? {
        let Some((year, week)) = parse_partition_key(&key) else {
            continue;
        };
        if year < state.config.min_year || year > current_year {
            continue;
        }
        let Some(raw) = state.store.get(&key).await.map_err(ApiError::from)? else {
            continue;
        };
        // Only weeks whose stored array actually holds items
        let non_empty = serde_json::from_str::<Vec<serde_json::Value>>(&raw)
            .map(|items| !items.is_empty())
            .unwrap_or(false);
        if non_empty {
            if let Some(weeks) = listing.get_mut(&year) {
                weeks.insert(week);
            }
        }
    }

    let body = serde_json::to_string(&listing)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    let response = CachedResponse {
        body,
        content_type: "application/json; charset=utf-8".to_string(),
    };
    if let Err(err) = state.cache.store_listing(&cache_key, &response).await {
        warn!(%err, "failed to cache data list");
    }

    Ok(super::agenda::cached_response(
        response,
        state.cache.list_ttl_secs(),
    ))
}

/// Split "agenda-<year>-<week>" into its pair.
fn parse_partition_key(key: &str) -> Option<(i32, u32)> {
    let rest = key.strip_prefix(PARTITION_PREFIX)?;
    let (year, week) = rest.split_once('-')?;
    Some((year.parse().ok()?, week.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_keys_parse_back_to_their_pair() {
        assert_eq!(parse_partition_key("agenda-2024-3"), Some((2024, 3)));
        assert_eq!(parse_partition_key("agenda-2024-52"), Some((2024, 52)));
        assert_eq!(parse_partition_key("cache-index"), None);
        assert_eq!(parse_partition_key("agenda-x-3"), None);
    }
}
