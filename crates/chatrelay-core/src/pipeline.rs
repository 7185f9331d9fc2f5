//! Inbound message handling.
//!
//! `MessagePipeline::handle` takes one message through validation, the admin
//! command, the quota check, the completion call, reply formatting, and the
//! state commit. Every path that does anything sends exactly one reply.
//!
//! Quota and upstream failures are reported to the user and end the message
//! normally. Only a failed send is returned as an error.

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use chatrelay_types::config::RelayConfig;
use chatrelay_types::error::RelayError;
use chatrelay_types::message::{HandleOutcome, InboundMessage};

use crate::admin::{self, AdminCommand};
use crate::completion::CompletionService;
use crate::prompt::{self, DEFAULT_MAX_PROMPT_CHARS};
use crate::quota::QuotaTracker;
use crate::reply;
use crate::session::SessionStore;
use crate::transport::{ReplySink, Roster};

/// Values the pipeline reads from configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Line prepended to formatted replies. Empty means none.
    pub reply_prefix: String,
    /// Display name allowed to run admin commands.
    pub admin_name: String,
    /// Hard cap on the prompt sent upstream, in characters.
    pub max_prompt_chars: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            reply_prefix: String::new(),
            admin_name: admin::DEFAULT_ADMIN_NAME.to_string(),
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }
}

impl From<&RelayConfig> for PipelineSettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            reply_prefix: config.reply_prefix.clone(),
            admin_name: config.admin_name.clone(),
            max_prompt_chars: config.prompt.max_chars,
        }
    }
}

/// Relays chat messages to a completion service under per-user quota.
///
/// The session and quota stores are shared with the rest of the process
/// (the sweeper, health reporting) and are passed in already constructed.
pub struct MessagePipeline<C, R> {
    sessions: Arc<SessionStore>,
    quota: Arc<QuotaTracker>,
    completion: C,
    roster: R,
    settings: PipelineSettings,
}

impl<C: CompletionService, R: Roster> MessagePipeline<C, R> {
    pub fn new(
        sessions: Arc<SessionStore>,
        quota: Arc<QuotaTracker>,
        completion: C,
        roster: R,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            sessions,
            quota,
            completion,
            roster,
            settings,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn quota(&self) -> &Arc<QuotaTracker> {
        &self.quota
    }

    pub fn completion(&self) -> &C {
        &self.completion
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Handle one inbound message, replying through `sink`.
    pub async fn handle<S: ReplySink>(
        &self,
        message: &InboundMessage,
        sink: &S,
    ) -> Result<HandleOutcome, RelayError> {
        let span = info_span!(
            "handle_message",
            message_id = %Uuid::now_v7(),
            sender_id = %message.sender_id,
        );
        self.handle_inner(message, sink).instrument(span).await
    }

    async fn handle_inner<S: ReplySink>(
        &self,
        message: &InboundMessage,
        sink: &S,
    ) -> Result<HandleOutcome, RelayError> {
        if !message.is_text() {
            debug!(kind = %message.kind, "ignoring non-text message");
            return Ok(HandleOutcome::Skipped);
        }

        debug!(sender = %message.sender_name, text = %message.text, "received text message");

        let user = message.sender_id.as_str();
        let text = prompt::clean_user_text(&message.text);
        let request = prompt::compose_request(&self.sessions.get_context(user), text);
        if request.is_empty() {
            info!("request text is empty, not replying");
            return Ok(HandleOutcome::Skipped);
        }

        if let Some(AdminCommand::ClearCache { target }) =
            AdminCommand::parse(&request, &message.sender_name, &self.settings.admin_name)
        {
            return self.clear_cache(target, sink).await;
        }

        let reservation = match self.quota.check_and_reserve(user) {
            Ok(reservation) => reservation,
            Err(exceeded) => {
                info!(count = exceeded.count, limit = exceeded.limit, "quota exhausted");
                let notice = reply::quota_exceeded_notice(self.quota.limit(), self.quota.window());
                sink.send_reply(&notice)
                    .await
                    .map_err(|source| RelayError::QuotaNotice {
                        count: exceeded.count,
                        source,
                    })?;
                return Ok(HandleOutcome::QuotaExceeded {
                    count: exceeded.count,
                });
            }
        };

        let prompt = prompt::truncate_chars(&request, self.settings.max_prompt_chars);
        if prompt.len() < request.len() {
            debug!(
                max_chars = self.settings.max_prompt_chars,
                "request text truncated"
            );
        }

        let span = info_span!(
            "completion",
            backend = self.completion.name(),
            used = reservation.count(),
            prompt_chars = prompt.chars().count(),
        );
        let raw = match self.completion.complete(prompt).instrument(span).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "completion request failed");
                drop(reservation);
                let notice = reply::upstream_failure_notice(&err);
                sink.send_reply(&notice)
                    .await
                    .map_err(|source| RelayError::UpstreamNotice {
                        upstream: err.to_string(),
                        source,
                    })?;
                return Ok(HandleOutcome::UpstreamFailed);
            }
        };

        let formatted = reply::build_reply(&raw, &self.settings.reply_prefix);

        self.sessions.set_context(user, text, &raw);
        let used = reservation.commit();
        info!(used, limit = self.quota.limit(), "relaying completion");

        sink.send_reply(&formatted).await.map_err(RelayError::Delivery)?;
        Ok(HandleOutcome::Replied { used })
    }

    async fn clear_cache<S: ReplySink>(
        &self,
        target: Option<String>,
        sink: &S,
    ) -> Result<HandleOutcome, RelayError> {
        let Some(target) = target else {
            sink.send_reply(&admin::usage_notice())
                .await
                .map_err(RelayError::Delivery)?;
            return Ok(HandleOutcome::AdminCleared {
                target: None,
                cleared: 0,
            });
        };

        let friends = match self.roster.list_friends().await {
            Ok(friends) => friends,
            Err(err) => {
                warn!(error = %err, "roster lookup failed, nothing to clear");
                Vec::new()
            }
        };

        let mut cleared = 0;
        for friend in friends.iter().filter(|f| f.display_name == target) {
            let had_quota = self.quota.delete(&friend.user_id);
            let had_session = self.sessions.clear(&friend.user_id);
            info!(
                user_id = %friend.user_id,
                display_name = %friend.display_name,
                had_quota,
                had_session,
                "cleared cached user state"
            );
            cleared += 1;
        }

        let notice = if cleared > 0 {
            admin::cleared_notice(&target)
        } else {
            admin::target_not_found_notice(&target)
        };
        sink.send_reply(&notice).await.map_err(RelayError::Delivery)?;

        Ok(HandleOutcome::AdminCleared {
            target: Some(target),
            cleared,
        })
    }
}
