//! Application state wiring the relay together.
//!
//! AppState owns the pipeline used by both the console command and the HTTP
//! handlers. The pipeline is generic over the completion service; AppState
//! pins it to the OpenAI-compatible client unless a test swaps it out.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use chatrelay_core::clock::{Clock, SystemClock};
use chatrelay_core::completion::CompletionService;
use chatrelay_core::pipeline::{MessagePipeline, PipelineSettings};
use chatrelay_core::quota::QuotaTracker;
use chatrelay_core::session::SessionStore;
use chatrelay_core::sweeper::spawn_sweeper;
use chatrelay_core::transport::StaticRoster;
use chatrelay_infra::config::resolve_api_key;
use chatrelay_infra::llm::OpenAiCompletionService;
use chatrelay_types::config::RelayConfig;

/// Shared application state.
pub struct AppState<C = OpenAiCompletionService> {
    pub config: Arc<RelayConfig>,
    pub pipeline: Arc<MessagePipeline<C, StaticRoster>>,
    pub started_at: DateTime<Utc>,
}

// Manual impl: derive(Clone) would require `C: Clone`.
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            pipeline: self.pipeline.clone(),
            started_at: self.started_at,
        }
    }
}

impl AppState {
    /// Build state from config, resolving the completion API key from the
    /// environment.
    pub fn init(config: RelayConfig) -> anyhow::Result<Self> {
        let api_key = resolve_api_key(&config.completion)?;
        let completion = OpenAiCompletionService::new(&config.completion, &api_key);
        tracing::info!(
            model = completion.model(),
            base_url = %config.completion.base_url,
            "completion service configured"
        );
        Self::with_completion(config, completion, Arc::new(SystemClock))
    }
}

impl<C: CompletionService + 'static> AppState<C> {
    /// Build state around an already constructed completion service.
    pub fn with_completion(
        config: RelayConfig,
        completion: C,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let ttl = seconds(config.session.ttl_secs).context("session.ttl_secs")?;
        let window = seconds(config.quota.window_secs).context("quota.window_secs")?;

        let mut sessions = SessionStore::new(ttl, clock.clone());
        if let Some(max_entries) = config.session.max_entries {
            sessions = sessions.with_max_entries(max_entries);
        }
        let quota = QuotaTracker::new(config.quota.limit, window, clock);

        let pipeline = MessagePipeline::new(
            Arc::new(sessions),
            Arc::new(quota),
            completion,
            StaticRoster::new(config.roster.clone()),
            PipelineSettings::from(&config),
        );

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            started_at: Utc::now(),
        })
    }

    /// Start the background cache sweeper. It runs until `cancel` fires.
    pub fn spawn_sweeper(&self, cancel: CancellationToken) -> JoinHandle<()> {
        spawn_sweeper(
            self.pipeline.sessions().clone(),
            self.pipeline.quota().clone(),
            std::time::Duration::from_secs(self.config.sweep_interval_secs),
            cancel,
        )
    }
}

fn seconds(secs: u64) -> anyhow::Result<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| anyhow::anyhow!("{secs} seconds is out of range"))
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_state_uses_configured_limits() {
        let state = test_state();
        assert_eq!(state.pipeline.quota().limit(), 3);
        assert_eq!(state.pipeline.quota().window(), Duration::hours(1));
        assert_eq!(state.pipeline.settings().admin_name, "锐");
    }

    #[test]
    fn test_out_of_range_ttl_is_rejected() {
        let mut config = RelayConfig::default();
        config.session.ttl_secs = u64::MAX;
        let result = AppState::with_completion(
            config,
            EchoCompletion,
            Arc::new(chatrelay_core::clock::ManualClock::default()),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_cancel() {
        let state = test_state();
        let cancel = CancellationToken::new();
        let handle = state.spawn_sweeper(cancel.clone());
        cancel.cancel();
        handle.await.unwrap();
    }
}
