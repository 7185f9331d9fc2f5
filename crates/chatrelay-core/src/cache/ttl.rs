//! Concurrent string-keyed cache with per-entry expiry.
//!
//! Expiry is lazy: a read that finds an expired entry treats it as absent
//! and removes it. [`TtlCache::sweep_expired`] clears the rest in bulk and is
//! driven by the background sweeper.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::clock::Clock;

#[derive(Debug, Clone)]
struct Expiring<V> {
    value: V,
    expires_at: DateTime<Utc>,
    /// Write sequence number, unique per insert.
    seq: u64,
}

impl<V> Expiring<V> {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Entry-count bound.
///
/// `order` lists writes oldest first. Every write uses the same TTL, so the
/// oldest live write is the entry closest to expiry. Records for keys that
/// were since overwritten or removed are skipped when popped.
#[derive(Debug)]
struct Bound {
    max: usize,
    order: Mutex<VecDeque<(String, u64)>>,
}

/// Sharded map from key to value where every write refreshes the entry's TTL.
pub struct TtlCache<V> {
    entries: DashMap<String, Expiring<V>>,
    ttl: Duration,
    bound: Option<Bound>,
    next_seq: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            bound: None,
            next_seq: AtomicU64::new(0),
            clock,
        }
    }

    /// Bound the number of cached keys.
    ///
    /// Inserting a new key into a full cache evicts the entry closest to
    /// expiry, which is an already expired one whenever any exists.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.bound = Some(Bound {
            max: max_entries.max(1),
            order: Mutex::new(VecDeque::new()),
        });
        self
    }

    /// Live value for `key`, or `None` if absent or expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        // The read guard is released above; removing under it would deadlock the shard.
        if expired {
            self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        }
        None
    }

    /// Store `value` under `key`, replacing any previous value and restarting its TTL.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now();
        let entry = Expiring {
            value,
            expires_at: now + self.ttl,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };

        let Some(bound) = &self.bound else {
            self.entries.insert(key, entry);
            return;
        };

        // Bounded writes are serialized so the size check, eviction and
        // insert cannot interleave with another writer's.
        let mut order = bound.order.lock().unwrap_or_else(|e| e.into_inner());
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= bound.max {
                let Some((victim, seq)) = order.pop_front() else {
                    break;
                };
                if self
                    .entries
                    .remove_if(&victim, |_, e| e.seq == seq)
                    .is_some()
                {
                    tracing::trace!(key = %victim, max = bound.max, "ttl cache full, evicted oldest entry");
                }
            }
        }

        order.push_back((key.clone(), entry.seq));
        self.entries.insert(key, entry);

        // Drop records of overwritten or removed keys once they dominate.
        if order.len() > bound.max.saturating_mul(2) {
            order.retain(|(k, seq)| self.entries.get(k).is_some_and(|e| e.seq == *seq));
        }
    }

    /// Remove `key`. Returns whether a live entry was removed.
    pub fn remove(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now))
    }

    /// Drop every expired entry and return how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("max_entries", &self.bound.as_ref().map(|b| b.max))
            .field("entries", &self.entries.len())
            .finish()
    }
}
