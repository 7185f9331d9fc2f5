//! HTTP request handlers for the webhook API.

pub mod health;
pub mod message;

use axum::response::IntoResponse;

use crate::http::response::ApiResponse;

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    ApiResponse::error(
        "NOT_FOUND",
        "No such route",
        uuid::Uuid::now_v7().to_string(),
        0,
    )
}
