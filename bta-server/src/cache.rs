//! Response cache coordination
//!
//! Rendered responses are cached by their full request URL with a
//! bounded TTL. The cache backend offers no key enumeration, so every
//! stored key is also registered in a persisted side-index (a plain
//! key set in the KV store) that targeted invalidation walks later.

use crate::store::KvStore;
use async_trait::async_trait;
use bta_common::Result;
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// KV key of the persisted cache-key side-index
const CACHE_INDEX_KEY: &str = "cache-index";

/// One cached rendered response
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub body: String,
    pub content_type: String,
}

/// Time-bounded response cache, replaceable in tests
#[async_trait]
pub trait EdgeCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>>;
    async fn put(&self, key: &str, response: &CachedResponse, ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// SQLite-backed response cache
pub struct SqliteEdgeCache {
    pool: SqlitePool,
}

impl SqliteEdgeCache {
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                content_type TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl EdgeCache for SqliteEdgeCache {
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
        let row: Option<(String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT body, content_type, expires_at FROM cache_entries WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((body, content_type, expires_at)) if expires_at > Utc::now() => {
                Ok(Some(CachedResponse { body, content_type }))
            }
            Some(_) => {
                // Expired entry: drop it lazily
                self.delete(key).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, response: &CachedResponse, ttl: Duration) -> Result<()> {
        sqlx::query(
            "INSERT INTO cache_entries (key, body, content_type, expires_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                 body = excluded.body,
                 content_type = excluded.content_type,
                 expires_at = excluded.expires_at",
        )
        .bind(key)
        .bind(&response.body)
        .bind(&response.content_type)
        .bind(Utc::now() + ttl)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM cache_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-memory response cache for tests
#[derive(Default)]
pub struct MemoryEdgeCache {
    entries: RwLock<HashMap<String, (CachedResponse, DateTime<Utc>)>>,
}

impl MemoryEdgeCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EdgeCache for MemoryEdgeCache {
    async fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(response, _)| response.clone()))
    }

    async fn put(&self, key: &str, response: &CachedResponse, ttl: Duration) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), (response.clone(), Utc::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Append-only set of known cache keys with explicit merge/delete
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheIndex {
    keys: BTreeSet<String>,
}

/// Wraps the edge cache with TTL policy, key registration and
/// partition-targeted invalidation.
pub struct CacheCoordinator {
    cache: Arc<dyn EdgeCache>,
    store: Arc<dyn KvStore>,
    agenda_ttl: Duration,
    list_ttl: Duration,
}

impl CacheCoordinator {
    pub fn new(
        cache: Arc<dyn EdgeCache>,
        store: Arc<dyn KvStore>,
        agenda_ttl_secs: u64,
        list_ttl_secs: u64,
    ) -> Self {
        Self {
            cache,
            store,
            agenda_ttl: Duration::seconds(agenda_ttl_secs as i64),
            list_ttl: Duration::seconds(list_ttl_secs as i64),
        }
    }

    pub fn agenda_ttl_secs(&self) -> i64 {
        self.agenda_ttl.num_seconds()
    }

    pub fn list_ttl_secs(&self) -> i64 {
        self.list_ttl.num_seconds()
    }

    pub async fn lookup(&self, key: &str) -> Result<Option<CachedResponse>> {
        self.cache.get(key).await
    }

    /// Cache a rendered agenda response and register its key.
    pub async fn store_agenda(&self, key: &str, response: &CachedResponse) -> Result<()> {
        self.cache.put(key, response, self.agenda_ttl).await?;
        self.register_key(key).await
    }

    /// Cache the data-list response (longer TTL) and register its key.
    pub async fn store_listing(&self, key: &str, response: &CachedResponse) -> Result<()> {
        self.cache.put(key, response, self.list_ttl).await?;
        self.register_key(key).await
    }

    /// Drop every indexed response whose parameters resolve to the
    /// changed (year, week). The longer-lived listing entry survives
    /// current-week changes: the set of existing weeks cannot change
    /// mid-week.
    pub async fn invalidate_partition(
        &self,
        year: i32,
        week: u32,
        is_current_week: bool,
    ) -> Result<()> {
        let mut index = self.load_index().await?;
        let current_year = Utc::now().year();

        let affected: Vec<String> = index
            .keys
            .iter()
            .filter(|key| {
                if is_listing_key(key) {
                    !is_current_week
                } else {
                    key_covers_partition(key, year, week, current_year)
                }
            })
            .cloned()
            .collect();

        if affected.is_empty() {
            return Ok(());
        }

        debug!(year, week, count = affected.len(), "invalidating cached responses");
        for key in &affected {
            self.cache.delete(key).await?;
            index.keys.remove(key);
        }
        self.save_index(&index).await
    }

    /// Drop every indexed response. Returns how many keys were removed.
    pub async fn purge_all(&self) -> Result<usize> {
        let index = self.load_index().await?;
        let count = index.keys.len();
        for key in &index.keys {
            self.cache.delete(key).await?;
        }
        self.save_index(&CacheIndex::default()).await?;
        Ok(count)
    }

    async fn register_key(&self, key: &str) -> Result<()> {
        let mut index = self.load_index().await?;
        if index.keys.insert(key.to_string()) {
            self.save_index(&index).await?;
        }
        Ok(())
    }

    async fn load_index(&self) -> Result<CacheIndex> {
        let Some(raw) = self.store.get(CACHE_INDEX_KEY).await? else {
            return Ok(CacheIndex::default());
        };
        match serde_json::from_str(&raw) {
            Ok(index) => Ok(index),
            Err(err) => {
                tracing::error!(%err, "cache index is corrupt, starting over");
                Ok(CacheIndex::default())
            }
        }
    }

    async fn save_index(&self, index: &CacheIndex) -> Result<()> {
        let encoded = serde_json::to_string(index)?;
        self.store.put(CACHE_INDEX_KEY, &encoded).await
    }
}

/// The data-list endpoint is invalidated as a whole, not per week.
fn is_listing_key(key: &str) -> bool {
    key.split('?')
        .next()
        .unwrap_or_default()
        .trim_end_matches('/')
        .ends_with("data-list")
}

/// Does this cached request cover the given partition? A key without a
/// week parameter is treated broadly: any query scoped to the matching
/// year (month, day or whole-year requests) may contain the week.
fn key_covers_partition(key: &str, year: i32, week: u32, current_year: i32) -> bool {
    let key_year = query_param(key, "year")
        .and_then(|v| v.parse::<i32>().ok())
        .unwrap_or(current_year);
    if key_year != year {
        return false;
    }
    match query_param(key, "week").and_then(|v| v.parse::<u32>().ok()) {
        Some(key_week) => key_week == week,
        None => true,
    }
}

fn query_param(key: &str, name: &str) -> Option<String> {
    let (_, query) = key.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(param, _)| *param == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKvStore;

    fn coordinator() -> CacheCoordinator {
        CacheCoordinator::new(
            Arc::new(MemoryEdgeCache::new()),
            Arc::new(MemoryKvStore::new()),
            300,
            3600,
        )
    }

    fn response(body: &str) -> CachedResponse {
        CachedResponse {
            body: body.into(),
            content_type: "application/json; charset=utf-8".into(),
        }
    }

    #[tokio::test]
    async fn hit_returns_stored_bytes_unchanged() {
        let cache = coordinator();
        cache.store_agenda("/json?year=2024&week=3", &response("[1]")).await.unwrap();
        let hit = cache.lookup("/json?year=2024&week=3").await.unwrap().unwrap();
        assert_eq!(hit.body, "[1]");
        assert_eq!(hit.content_type, "application/json; charset=utf-8");
    }

    #[tokio::test]
    async fn invalidation_targets_only_covering_keys() {
        let cache = coordinator();
        cache.store_agenda("/json?year=2024&week=3", &response("a")).await.unwrap();
        cache.store_agenda("/json?year=2024&week=4", &response("b")).await.unwrap();
        cache.store_agenda("/ical?year=2024", &response("c")).await.unwrap();
        cache.store_agenda("/json?year=2023&week=3", &response("d")).await.unwrap();

        cache.invalidate_partition(2024, 3, false).await.unwrap();

        assert!(cache.lookup("/json?year=2024&week=3").await.unwrap().is_none());
        assert!(cache.lookup("/ical?year=2024").await.unwrap().is_none(), "year query may contain week 3");
        assert!(cache.lookup("/json?year=2024&week=4").await.unwrap().is_some());
        assert!(cache.lookup("/json?year=2023&week=3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn listing_entry_survives_current_week_changes() {
        let cache = coordinator();
        cache.store_listing("/data-list", &response("{}")).await.unwrap();

        cache.invalidate_partition(2024, 3, true).await.unwrap();
        assert!(cache.lookup("/data-list").await.unwrap().is_some());

        cache.invalidate_partition(2024, 3, false).await.unwrap();
        assert!(cache.lookup("/data-list").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_clears_index_and_entries() {
        let cache = coordinator();
        cache.store_agenda("/json?year=2024&week=3", &response("a")).await.unwrap();
        cache.store_listing("/data-list", &response("{}")).await.unwrap();

        assert_eq!(cache.purge_all().await.unwrap(), 2);
        assert!(cache.lookup("/json?year=2024&week=3").await.unwrap().is_none());
        assert_eq!(cache.purge_all().await.unwrap(), 0);
    }

    #[test]
    fn key_matching_defaults_missing_year_to_current() {
        assert!(key_covers_partition("/json", 2024, 3, 2024));
        assert!(!key_covers_partition("/json", 2024, 3, 2025));
        assert!(key_covers_partition("/json?week=3", 2024, 3, 2024));
        assert!(!key_covers_partition("/json?week=4", 2024, 3, 2024));
    }
}
