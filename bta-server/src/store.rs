//! Key-value persistence
//!
//! One partition per (year, week), stored as a JSON-encoded item array
//! under `agenda-<year>-<week>`. The store is reached only through the
//! [`KvStore`] trait so tests can substitute the in-memory fake.

use async_trait::async_trait;
use bta_common::{AgendaItem, Result};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::error;

/// Common prefix of every partition key
pub const PARTITION_PREFIX: &str = "agenda-";

/// Key of one (year, week) partition
pub fn partition_key(year: i32, week: u32) -> String {
    format!("agenda-{year}-{week}")
}

/// Minimal key-value contract: the only operations the backing store
/// has to offer.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    /// All keys starting with `prefix`, sorted ascending.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Open or create the SQLite database backing store and cache.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    Ok(pool)
}

/// SQLite-backed key-value store
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Create the store, initializing its table if missing.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let keys = sqlx::query_scalar("SELECT key FROM kv_entries WHERE key LIKE ? || '%' ORDER BY key")
            .bind(prefix)
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }
}

/// In-memory key-value store for tests
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Load one stored partition. A corrupt value is logged and treated as
/// absent, so the caller refetches instead of failing the request.
pub async fn load_partition(
    store: &dyn KvStore,
    year: i32,
    week: u32,
) -> Result<Option<Vec<AgendaItem>>> {
    let key = partition_key(year, week);
    let Some(raw) = store.get(&key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(items) => Ok(Some(items)),
        Err(err) => {
            error!(%key, %err, "stored partition is corrupt, treating as absent");
            Ok(None)
        }
    }
}

/// Replace one partition wholesale.
pub async fn save_partition(
    store: &dyn KvStore,
    year: i32,
    week: u32,
    items: &[AgendaItem],
) -> Result<()> {
    let encoded = serde_json::to_string(items)?;
    store.put(&partition_key(year, week), &encoded).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trips_and_lists_by_prefix() {
        let store = MemoryKvStore::new();
        store.put("agenda-2024-1", "[]").await.unwrap();
        store.put("agenda-2024-2", "[]").await.unwrap();
        store.put("cache-index", "{}").await.unwrap();

        assert_eq!(store.get("agenda-2024-1").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(
            store.list(PARTITION_PREFIX).await.unwrap(),
            vec!["agenda-2024-1".to_string(), "agenda-2024-2".to_string()]
        );

        store.delete("agenda-2024-1").await.unwrap();
        assert!(store.get("agenda-2024-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sqlite_store_round_trips_and_overwrites() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let store = SqliteKvStore::new(pool).await.unwrap();

        store.put("agenda-2024-3", "[1]").await.unwrap();
        store.put("agenda-2024-3", "[2]").await.unwrap();
        assert_eq!(store.get("agenda-2024-3").await.unwrap().as_deref(), Some("[2]"));
        assert_eq!(store.list("agenda-").await.unwrap(), vec!["agenda-2024-3".to_string()]);
    }

    #[tokio::test]
    async fn corrupt_partition_is_treated_as_absent() {
        let store = MemoryKvStore::new();
        store.put(&partition_key(2024, 3), "not json").await.unwrap();
        assert!(load_partition(&store, 2024, 3).await.unwrap().is_none());
    }
}
