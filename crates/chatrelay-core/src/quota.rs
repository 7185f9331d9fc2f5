//! Per-user usage quota with a sliding expiry window.
//!
//! Each user may complete `limit` requests per window. The window restarts
//! from every successful use, so the count only resets after a full window of
//! inactivity. Rejected requests never touch the count.
//!
//! Checking and counting are split across the completion call: a check hands
//! out a [`QuotaReservation`] that holds a pending slot, so concurrent
//! requests from one user cannot all pass the check before any of them is
//! counted. Committing the reservation turns the slot into a use; dropping it
//! gives the slot back.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::clock::Clock;

/// Default successful uses per window.
pub const DEFAULT_QUOTA_LIMIT: u32 = 3;

/// Default window length, in seconds.
pub const DEFAULT_QUOTA_WINDOW_SECS: i64 = 3600;

/// Returned when a user has no uses left in the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("quota exhausted: {count} of {limit} uses in the current window")]
pub struct QuotaExceeded {
    pub count: u32,
    pub limit: u32,
}

#[derive(Debug, Default)]
struct QuotaEntry {
    count: u32,
    /// Reservations handed out but not yet committed or released.
    pending: u32,
    window_expires_at: Option<DateTime<Utc>>,
}

impl QuotaEntry {
    fn expire_if_due(&mut self, now: DateTime<Utc>) {
        if self.window_expires_at.is_some_and(|at| at <= now) {
            self.count = 0;
            self.window_expires_at = None;
        }
    }

    fn is_idle(&self) -> bool {
        self.count == 0 && self.pending == 0
    }

    fn record_use(&mut self, now: DateTime<Utc>, window: Duration) -> u32 {
        self.expire_if_due(now);
        self.count = self.count.saturating_add(1);
        self.window_expires_at = Some(now + window);
        self.count
    }
}

/// Shared per-user usage counters.
pub struct QuotaTracker {
    limit: u32,
    window: Duration,
    entries: DashMap<String, QuotaEntry>,
    clock: Arc<dyn Clock>,
}

impl QuotaTracker {
    pub fn new(limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit,
            window,
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Uses recorded for `user` in the current window (0 if absent or expired).
    pub fn count(&self, user: &str) -> u32 {
        let now = self.clock.now();
        self.entries
            .get(user)
            .map(|entry| match entry.window_expires_at {
                Some(at) if at <= now => 0,
                _ => entry.count,
            })
            .unwrap_or(0)
    }

    /// Check whether `user` may make another request and, if so, hold a slot.
    ///
    /// Returns [`QuotaExceeded`] when recorded uses plus outstanding
    /// reservations already reach the limit.
    pub fn check_and_reserve(&self, user: &str) -> Result<QuotaReservation<'_>, QuotaExceeded> {
        let now = self.clock.now();
        let mut entry = self.entries.entry(user.to_string()).or_default();
        entry.expire_if_due(now);

        if entry.count.saturating_add(entry.pending) >= self.limit {
            let exceeded = QuotaExceeded {
                count: entry.count,
                limit: self.limit,
            };
            let idle = entry.is_idle();
            drop(entry);
            if idle {
                self.entries.remove_if(user, |_, entry| entry.is_idle());
            }
            return Err(exceeded);
        }

        entry.pending += 1;
        Ok(QuotaReservation {
            tracker: self,
            user: user.to_string(),
            count: entry.count,
            settled: false,
        })
    }

    /// Record one use for `user` and restart their window from now.
    ///
    /// Returns the count after the increment.
    pub fn increment(&self, user: &str) -> u32 {
        let now = self.clock.now();
        let mut entry = self.entries.entry(user.to_string()).or_default();
        entry.record_use(now, self.window)
    }

    /// Reset `user`'s quota. Returns whether an entry existed.
    pub fn delete(&self, user: &str) -> bool {
        self.entries.remove(user).is_some()
    }

    /// Drop entries whose window has elapsed and that hold no reservations.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            entry.expire_if_due(now);
            !entry.is_idle()
        });
        before.saturating_sub(self.entries.len())
    }

    /// Number of tracked users, including expired entries not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn commit_reserved(&self, user: &str) -> u32 {
        let now = self.clock.now();
        let mut entry = self.entries.entry(user.to_string()).or_default();
        entry.pending = entry.pending.saturating_sub(1);
        entry.record_use(now, self.window)
    }

    fn release(&self, user: &str) {
        let idle = match self.entries.get_mut(user) {
            Some(mut entry) => {
                entry.pending = entry.pending.saturating_sub(1);
                entry.is_idle()
            }
            None => false,
        };
        if idle {
            self.entries.remove_if(user, |_, entry| entry.is_idle());
        }
    }
}

impl std::fmt::Debug for QuotaTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaTracker")
            .field("limit", &self.limit)
            .field("window", &self.window)
            .field("tracked_users", &self.entries.len())
            .finish()
    }
}

/// A held quota slot. Commit it after a successful use; drop it otherwise.
#[must_use = "dropping a reservation releases the slot without recording a use"]
pub struct QuotaReservation<'a> {
    tracker: &'a QuotaTracker,
    user: String,
    count: u32,
    settled: bool,
}

impl QuotaReservation<'_> {
    /// Uses already recorded when the slot was reserved.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Record the use and restart the window. Returns the new count.
    pub fn commit(mut self) -> u32 {
        self.settled = true;
        self.tracker.commit_reserved(&self.user)
    }
}

impl Drop for QuotaReservation<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.release(&self.user);
        }
    }
}

impl std::fmt::Debug for QuotaReservation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaReservation")
            .field("user", &self.user)
            .field("count", &self.count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn tracker(limit: u32) -> (Arc<QuotaTracker>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let tracker = QuotaTracker::new(
            limit,
            Duration::seconds(DEFAULT_QUOTA_WINDOW_SECS),
            clock.clone(),
        );
        (Arc::new(tracker), clock)
    }

    #[test]
    fn test_fresh_user_is_allowed_with_zero_count() {
        let (quota, _clock) = tracker(3);
        let reservation = quota.check_and_reserve("u1").unwrap();
        assert_eq!(reservation.count(), 0);
    }

    #[test]
    fn test_rejects_after_limit_without_incrementing() {
        let (quota, _clock) = tracker(3);
        for expected in 1..=3 {
            let used = quota.check_and_reserve("u1").unwrap().commit();
            assert_eq!(used, expected);
        }

        let err = quota.check_and_reserve("u1").unwrap_err();
        assert_eq!(err, QuotaExceeded { count: 3, limit: 3 });
        assert_eq!(quota.count("u1"), 3);

        // A second rejection still leaves the count alone.
        assert!(quota.check_and_reserve("u1").is_err());
        assert_eq!(quota.count("u1"), 3);
    }

    #[test]
    fn test_dropped_reservation_releases_slot() {
        let (quota, _clock) = tracker(1);
        {
            let _held = quota.check_and_reserve("u1").unwrap();
            assert!(quota.check_and_reserve("u1").is_err());
        }
        assert_eq!(quota.count("u1"), 0);
        assert!(quota.is_empty());
        assert!(quota.check_and_reserve("u1").is_ok());
    }

    #[test]
    fn test_window_elapsing_resets_quota() {
        let (quota, clock) = tracker(3);
        for _ in 0..3 {
            quota.increment("u1");
        }
        assert!(quota.check_and_reserve("u1").is_err());

        clock.advance(Duration::seconds(DEFAULT_QUOTA_WINDOW_SECS));
        assert_eq!(quota.count("u1"), 0);
        let reservation = quota.check_and_reserve("u1").unwrap();
        assert_eq!(reservation.count(), 0);
        assert_eq!(reservation.commit(), 1);
    }

    #[test]
    fn test_window_slides_on_each_use() {
        let (quota, clock) = tracker(3);
        quota.increment("u1");
        clock.advance(Duration::minutes(50));
        quota.increment("u1");
        clock.advance(Duration::minutes(50));

        // 100 minutes after the first use, but only 50 after the last.
        assert_eq!(quota.count("u1"), 2);

        clock.advance(Duration::minutes(10));
        assert_eq!(quota.count("u1"), 0);
    }

    #[test]
    fn test_delete_resets_user() {
        let (quota, _clock) = tracker(3);
        for _ in 0..3 {
            quota.increment("u1");
        }
        quota.increment("u2");

        assert!(quota.delete("u1"));
        assert!(!quota.delete("u1"));
        assert_eq!(quota.count("u1"), 0);
        assert_eq!(quota.count("u2"), 1);
        assert!(quota.check_and_reserve("u1").is_ok());
    }

    #[test]
    fn test_sweep_removes_expired_but_keeps_reserved() {
        let (quota, clock) = tracker(3);
        quota.increment("idle");
        quota.increment("busy");
        clock.advance(Duration::seconds(DEFAULT_QUOTA_WINDOW_SECS + 1));

        let held = quota.check_and_reserve("busy").unwrap();
        assert_eq!(quota.sweep_expired(), 1);
        assert_eq!(quota.len(), 1);
        assert_eq!(held.commit(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_admit_exactly_limit() {
        let (quota, _clock) = tracker(3);

        let mut handles = Vec::new();
        for _ in 0..20 {
            let q = quota.clone();
            handles.push(tokio::spawn(async move {
                match q.check_and_reserve("shared") {
                    Ok(reservation) => {
                        tokio::task::yield_now().await;
                        reservation.commit();
                        true
                    }
                    Err(_) => false,
                }
            }));
        }

        let mut allowed = 0;
        let mut rejected = 0;
        for handle in handles {
            if handle.await.unwrap() {
                allowed += 1;
            } else {
                rejected += 1;
            }
        }

        assert_eq!(allowed, 3);
        assert_eq!(rejected, 17);
        assert_eq!(quota.count("shared"), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let (quota, _clock) = tracker(u32::MAX);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let q = quota.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..250 {
                    q.increment("hot");
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(quota.count("hot"), 2000);
    }
}
