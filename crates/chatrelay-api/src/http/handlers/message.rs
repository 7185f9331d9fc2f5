//! Inbound message webhook.
//!
//! POST /api/v1/messages - Relay one chat message and return the reply.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use chatrelay_core::completion::CompletionService;
use chatrelay_infra::transport::BufferedSink;
use chatrelay_types::message::{HandleOutcome, InboundMessage};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// What the relay did, plus the reply to deliver (absent when skipped).
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    #[serde(flatten)]
    pub outcome: HandleOutcome,
    pub reply: Option<String>,
}

/// POST /api/v1/messages
pub async fn post_message<C: CompletionService + 'static>(
    State(state): State<AppState<C>>,
    Json(message): Json<InboundMessage>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    if message.sender_id.trim().is_empty() {
        return Err(AppError::Validation("sender_id is required".to_string()));
    }

    let sink = BufferedSink::new();
    let outcome = state.pipeline.handle(&message, &sink).await?;
    let reply = sink.drain().pop();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        MessageResponse { outcome, reply },
        request_id,
        elapsed,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::test_state;

    async fn post(
        state: &AppState<crate::state::testing::EchoCompletion>,
        message: InboundMessage,
    ) -> Result<MessageResponse, AppError> {
        let Json(resp) = post_message(State(state.clone()), Json(message)).await?;
        Ok(resp.data.unwrap())
    }

    #[tokio::test]
    async fn test_text_message_returns_reply() {
        let state = test_state();
        let resp = post(&state, InboundMessage::text("@alice", "Alice", "hi"))
            .await
            .unwrap();

        assert_eq!(resp.outcome, HandleOutcome::Replied { used: 1 });
        assert_eq!(resp.reply.as_deref(), Some("echo: hi"));
    }

    #[tokio::test]
    async fn test_skipped_message_has_no_reply() {
        let state = test_state();
        let mut message = InboundMessage::text("@alice", "Alice", "hi");
        message.kind = chatrelay_types::message::MessageKind::Voice;

        let resp = post(&state, message).await.unwrap();
        assert_eq!(resp.outcome, HandleOutcome::Skipped);
        assert!(resp.reply.is_none());
    }

    #[tokio::test]
    async fn test_fourth_message_reports_quota() {
        let state = test_state();
        for _ in 0..3 {
            post(&state, InboundMessage::text("@bob", "Bob", "q"))
                .await
                .unwrap();
        }

        let resp = post(&state, InboundMessage::text("@bob", "Bob", "q"))
            .await
            .unwrap();
        assert_eq!(resp.outcome, HandleOutcome::QuotaExceeded { count: 3 });
        assert!(resp.reply.unwrap().contains("3次"));
    }

    #[tokio::test]
    async fn test_admin_clear_over_http() {
        let state = test_state();
        post(&state, InboundMessage::text("@alice", "Alice", "q"))
            .await
            .unwrap();

        let resp = post(&state, InboundMessage::text("@root", "锐", "清除用户缓存:Alice"))
            .await
            .unwrap();

        assert_eq!(
            resp.outcome,
            HandleOutcome::AdminCleared {
                target: Some("Alice".to_string()),
                cleared: 1
            }
        );
        assert_eq!(state.pipeline.quota().count("@alice"), 0);
    }

    #[tokio::test]
    async fn test_blank_sender_is_rejected() {
        let state = test_state();
        let err = post(&state, InboundMessage::text(" ", "Nobody", "hi"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_response_flattens_outcome() {
        let resp = MessageResponse {
            outcome: HandleOutcome::Replied { used: 2 },
            reply: Some("hello".to_string()),
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["outcome"], "replied");
        assert_eq!(value["used"], 2);
        assert_eq!(value["reply"], "hello");
    }
}
