//! Query planning and partition resolution
//!
//! Expands a (year | year+week | year+month | year+month+day) request
//! into week partitions, loading each from the store and falling back
//! to fetch → parse → reconcile on a miss. On-demand backfills and the
//! scheduled refresh share the same path; the planner does not care
//! why a partition is missing.
//!
//! Partitions are keyed by the requested *calendar* year plus the ISO
//! week number, so a query near a year boundary can touch a week whose
//! ISO week-year differs. The scheduled job, data-list enumeration and
//! cache invalidation all compute the same pair.

use crate::cache::CacheCoordinator;
use crate::fetch::AgendaFetcher;
use crate::parse::parse_agenda;
use crate::reconcile::reconcile;
use crate::store::{load_partition, KvStore};
use bta_common::week::{iso_week_number, weeks_in_month};
use bta_common::{AgendaItem, Error, Result};
use chrono::{Datelike, NaiveDate, Utc};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::info;

/// A parsed agenda request
#[derive(Debug, Default, Clone)]
pub struct AgendaQuery {
    pub year: Option<i32>,
    pub week: Option<u32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub status: Option<String>,
}

/// The core pipeline: store, upstream fetcher and cache invalidation
/// wired together behind one façade.
pub struct AgendaService {
    store: Arc<dyn KvStore>,
    fetcher: Arc<dyn AgendaFetcher>,
    cache: Arc<CacheCoordinator>,
}

impl AgendaService {
    pub fn new(
        store: Arc<dyn KvStore>,
        fetcher: Arc<dyn AgendaFetcher>,
        cache: Arc<CacheCoordinator>,
    ) -> Self {
        Self {
            store,
            fetcher,
            cache,
        }
    }

    /// Resolve a request into its merged, filtered item sequence.
    pub async fn resolve(&self, query: &AgendaQuery) -> Result<Vec<AgendaItem>> {
        let (current_year, current_week) = current_year_week();
        let year = query.year.unwrap_or(current_year);

        if year > current_year
            || (year == current_year && query.week.map_or(false, |week| week > current_week))
        {
            return Err(Error::FutureRange {
                year,
                week: query.week,
            });
        }

        let mut items = if let Some(week) = query.week {
            self.ensure_week(year, week).await?
        } else if let Some(month) = query.month {
            match query.day {
                Some(day) => self.day_items(year, month, day).await?,
                None => self.month_items(year, month).await?,
            }
        } else if query.day.is_some() {
            return Err(Error::InvalidInput(
                "day queries also require a month".into(),
            ));
        } else {
            self.year_items(year, current_year, current_week).await?
        };

        if let Some(filter) = query.status.as_deref().filter(|s| !s.is_empty()) {
            items.retain(|item| !item.status.is_empty() && item.status.contains(filter));
        }

        Ok(items)
    }

    /// Scheduled entry point: refresh the current week's partition.
    /// Returns whether the stored set changed.
    pub async fn refresh_current_week(&self) -> Result<bool> {
        let (year, week) = current_year_week();
        info!(year, week, "refreshing current conference week");
        self.fetch_and_reconcile(year, week).await.map(|(_, changed)| changed)
    }

    /// Partition items for (year, week), fetching upstream on a store
    /// miss.
    async fn ensure_week(&self, year: i32, week: u32) -> Result<Vec<AgendaItem>> {
        if let Some(items) = load_partition(&*self.store, year, week).await? {
            return Ok(items);
        }
        self.fetch_and_reconcile(year, week).await.map(|(items, _)| items)
    }

    async fn fetch_and_reconcile(&self, year: i32, week: u32) -> Result<(Vec<AgendaItem>, bool)> {
        let html = self.fetcher.fetch_week(year, week).await?;
        let parsed = parse_agenda(&html);
        let outcome = reconcile(&*self.store, year, week, parsed).await?;

        if outcome.changed {
            let (current_year, current_week) = current_year_week();
            let is_current = year == current_year && week == current_week;
            self.cache.invalidate_partition(year, week, is_current).await?;
        }

        Ok((outcome.items, outcome.changed))
    }

    async fn month_items(&self, year: i32, month: u32) -> Result<Vec<AgendaItem>> {
        let loads = weeks_in_month(year, month)
            .into_iter()
            .map(|week| self.ensure_week(year, week));
        let weeks = try_join_all(loads).await?;
        Ok(weeks.into_iter().flatten().collect())
    }

    async fn day_items(&self, year: i32, month: u32, day: u32) -> Result<Vec<AgendaItem>> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| Error::InvalidInput(format!("no such day: {year}-{month}-{day}")))?;
        let items = self.ensure_week(year, iso_week_number(date)).await?;
        Ok(items
            .into_iter()
            .filter(|item| item.start.date() == date)
            .collect())
    }

    async fn year_items(
        &self,
        year: i32,
        current_year: i32,
        current_week: u32,
    ) -> Result<Vec<AgendaItem>> {
        let last_week = if year == current_year { current_week } else { 52 };
        let loads = (1..=last_week).map(|week| self.ensure_week(year, week));
        let weeks = try_join_all(loads).await?;
        Ok(weeks.into_iter().flatten().collect())
    }
}

/// Current (calendar year, ISO week) pair, the upper bound for every
/// query and the target of the scheduled refresh.
pub fn current_year_week() -> (i32, u32) {
    let today = Utc::now().date_naive();
    (today.year(), iso_week_number(today))
}
