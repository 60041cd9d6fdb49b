//! Scheduled refresh of the current conference week
//!
//! Runs forever on a fixed interval. A failed cycle is logged and
//! skipped; the next one retries naturally.

use crate::planner::AgendaService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

pub fn spawn_refresh_task(service: Arc<AgendaService>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match service.refresh_current_week().await {
                Ok(changed) => info!(changed, "scheduled agenda refresh complete"),
                Err(err) => warn!(%err, "scheduled agenda refresh failed, retrying next cycle"),
            }
        }
    })
}
