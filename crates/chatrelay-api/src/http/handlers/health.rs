//! Liveness and cache statistics.
//!
//! GET /api/v1/health

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use chatrelay_core::completion::CompletionService;

use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: i64,
    /// Users with a stored session context (expired entries included until swept).
    pub sessions: usize,
    /// Users with a quota entry.
    pub quota_users: usize,
    pub quota_limit: u32,
    pub quota_window_secs: i64,
}

/// GET /api/v1/health
pub async fn health<C: CompletionService + 'static>(
    State(state): State<AppState<C>>,
) -> Json<ApiResponse<HealthResponse>> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let quota = state.pipeline.quota();
    let data = HealthResponse {
        status: "ok",
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
        sessions: state.pipeline.sessions().len(),
        quota_users: quota.len(),
        quota_limit: quota.limit(),
        quota_window_secs: quota.window().num_seconds(),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Json(ApiResponse::success(data, request_id, elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::test_state;

    #[tokio::test]
    async fn test_reports_store_sizes() {
        let state = test_state();
        state.pipeline.sessions().set_context("@alice", "q", "a");
        state.pipeline.quota().increment("@alice");
        state.pipeline.quota().increment("@bob");

        let Json(resp) = health(State(state)).await;
        let data = resp.data.unwrap();

        assert_eq!(data.status, "ok");
        assert_eq!(data.sessions, 1);
        assert_eq!(data.quota_users, 2);
        assert_eq!(data.quota_limit, 3);
        assert_eq!(data.quota_window_secs, 3600);
    }
}
