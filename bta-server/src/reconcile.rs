//! Partition reconciliation
//!
//! Compares a freshly parsed item set against the stored partition and
//! replaces the partition wholesale when anything changed. Unchanged
//! items keep their stored record (and with it the original
//! `dtstamp`); `dtstamp` itself never counts as a change, it is
//! regenerated on every parse.

use crate::store::{load_partition, save_partition, KvStore};
use bta_common::{AgendaItem, Result};
use std::collections::HashMap;

/// Result of reconciling one partition
pub struct ReconcileOutcome {
    /// True when the partition was (re)written and dependent caches
    /// need invalidation
    pub changed: bool,
    /// The item set now held by the partition
    pub items: Vec<AgendaItem>,
}

/// Reconcile `new_items` against the stored (year, week) partition.
pub async fn reconcile(
    store: &dyn KvStore,
    year: i32,
    week: u32,
    new_items: Vec<AgendaItem>,
) -> Result<ReconcileOutcome> {
    let Some(existing) = load_partition(store, year, week).await? else {
        save_partition(store, year, week, &new_items).await?;
        return Ok(ReconcileOutcome {
            changed: true,
            items: new_items,
        });
    };

    let mut changed = false;
    let merged: Vec<AgendaItem> = {
        let by_uid: HashMap<&str, &AgendaItem> =
            existing.iter().map(|item| (item.uid.as_str(), item)).collect();
        new_items
            .into_iter()
            .map(|next| match by_uid.get(next.uid.as_str()) {
                Some(prev) if !item_changed(prev, &next) => (*prev).clone(),
                _ => {
                    changed = true;
                    next
                }
            })
            .collect()
    };

    if changed {
        save_partition(store, year, week, &merged).await?;
        Ok(ReconcileOutcome {
            changed: true,
            items: merged,
        })
    } else {
        Ok(ReconcileOutcome {
            changed: false,
            items: existing,
        })
    }
}

/// Deep equality over everything except the volatile `dtstamp`.
fn item_changed(prev: &AgendaItem, next: &AgendaItem) -> bool {
    prev.start != next.start
        || prev.end != next.end
        || prev.top != next.top
        || prev.thema != next.thema
        || prev.beschreibung != next.beschreibung
        || prev.url != next.url
        || prev.status != next.status
        || prev.namentliche_abstimmung != next.namentliche_abstimmung
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{partition_key, MemoryKvStore};
    use bta_common::model::make_uid;
    use chrono::{NaiveDate, Utc};

    fn item(hour: u32, thema: &str, status: &str) -> AgendaItem {
        let start = NaiveDate::from_ymd_opt(2024, 1, 17)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        AgendaItem {
            start,
            end: start + chrono::Duration::hours(1),
            top: "TOP 1".into(),
            thema: thema.into(),
            beschreibung: String::new(),
            url: None,
            status: status.into(),
            namentliche_abstimmung: false,
            uid: make_uid(start, thema, "TOP 1"),
            dtstamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn first_fetch_creates_the_partition() {
        let store = MemoryKvStore::new();
        let outcome = reconcile(&store, 2024, 3, vec![item(13, "Befragung", "")])
            .await
            .unwrap();
        assert!(outcome.changed);
        assert!(store.get(&partition_key(2024, 3)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn identical_refetch_is_idempotent() {
        let store = MemoryKvStore::new();
        let first = reconcile(&store, 2024, 3, vec![item(13, "Befragung", "")])
            .await
            .unwrap();
        assert!(first.changed);

        // Fresh parse of the same page: same content, new dtstamp
        let second = reconcile(&store, 2024, 3, vec![item(13, "Befragung", "")])
            .await
            .unwrap();
        assert!(!second.changed);
        assert_eq!(second.items, first.items);
    }

    #[tokio::test]
    async fn changed_status_replaces_the_partition() {
        let store = MemoryKvStore::new();
        reconcile(&store, 2024, 3, vec![item(13, "Befragung", "")])
            .await
            .unwrap();

        let outcome = reconcile(&store, 2024, 3, vec![item(13, "Befragung", "beendet")])
            .await
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.items[0].status, "beendet");

        let stored = load_partition(&store, 2024, 3).await.unwrap().unwrap();
        assert_eq!(stored[0].status, "beendet");
    }

    #[tokio::test]
    async fn unchanged_items_keep_their_stored_dtstamp() {
        let store = MemoryKvStore::new();
        let first = reconcile(&store, 2024, 3, vec![item(13, "Befragung", "")])
            .await
            .unwrap();
        let original_dtstamp = first.items[0].dtstamp;

        let outcome = reconcile(
            &store,
            2024,
            3,
            vec![item(13, "Befragung", ""), item(15, "Fragestunde", "")],
        )
        .await
        .unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.items[0].dtstamp, original_dtstamp);
        assert_eq!(outcome.items.len(), 2);
    }

    #[tokio::test]
    async fn vanished_items_alone_do_not_rewrite() {
        let store = MemoryKvStore::new();
        reconcile(
            &store,
            2024,
            3,
            vec![item(13, "Befragung", ""), item(15, "Fragestunde", "")],
        )
        .await
        .unwrap();

        // The later scrape lost one row but changed nothing else
        let outcome = reconcile(&store, 2024, 3, vec![item(13, "Befragung", "")])
            .await
            .unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.items.len(), 2, "stored set is returned untouched");
    }

    #[tokio::test]
    async fn corrupt_partition_is_replaced_like_a_first_fetch() {
        let store = MemoryKvStore::new();
        store.put(&partition_key(2024, 3), "{{{").await.unwrap();

        let outcome = reconcile(&store, 2024, 3, vec![item(13, "Befragung", "")])
            .await
            .unwrap();
        assert!(outcome.changed);
        let stored = load_partition(&store, 2024, 3).await.unwrap().unwrap();
        assert_eq!(stored.len(), 1);
    }
}
