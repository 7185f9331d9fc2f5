//! Background eviction of expired cache entries.
//!
//! Expired entries are already invisible to readers; the sweeper only keeps
//! the maps from growing with users who never come back.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::quota::QuotaTracker;
use crate::session::SessionStore;

/// Spawn a task that sweeps both stores every `every` until `cancel` fires.
pub fn spawn_sweeper(
    sessions: Arc<SessionStore>,
    quota: Arc<QuotaTracker>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("cache sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let sessions_evicted = sessions.sweep_expired();
                    let quotas_evicted = quota.sweep_expired();
                    if sessions_evicted + quotas_evicted > 0 {
                        tracing::debug!(
                            sessions_evicted,
                            quotas_evicted,
                            sessions_live = sessions.len(),
                            quotas_live = quota.len(),
                            "swept expired cache entries"
                        );
                    }
                }
            }
        }
    })
}
