//! Per-user rolling conversation context.
//!
//! Each user keeps exactly one turn of context: the last thing they said
//! followed by the reply they got. Writing a new turn replaces the old one and
//! restarts its TTL. The stored text is not bounded here; the prompt builder
//! caps what is sent upstream.

use std::sync::Arc;

use chrono::Duration;

use crate::cache::TtlCache;
use crate::clock::Clock;

/// Default lifetime of a session context, in seconds.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug)]
pub struct SessionStore {
    contexts: TtlCache<String>,
}

impl SessionStore {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            contexts: TtlCache::new(ttl, clock),
        }
    }

    /// Bound the number of users whose context is cached.
    pub fn with_max_entries(self, max_entries: usize) -> Self {
        Self {
            contexts: self.contexts.with_max_entries(max_entries),
        }
    }

    /// Stored context for `user`, or an empty string if absent or expired.
    pub fn get_context(&self, user: &str) -> String {
        self.contexts.get(user).unwrap_or_default()
    }

    /// Replace `user`'s context with the latest turn.
    pub fn set_context(&self, user: &str, prior_user_text: &str, reply_text: &str) {
        let mut context = String::with_capacity(prior_user_text.len() + reply_text.len());
        context.push_str(prior_user_text);
        context.push_str(reply_text);
        self.contexts.insert(user, context);
    }

    /// Forget `user`'s context. No-op if there is none.
    pub fn clear(&self, user: &str) -> bool {
        self.contexts.remove(user)
    }

    pub fn sweep_expired(&self) -> usize {
        self.contexts.sweep_expired()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
