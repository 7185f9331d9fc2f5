//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};

use chatrelay_types::error::RelayError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// The pipeline could not deliver its reply.
    Relay(RelayError),
    /// Malformed request.
    Validation(String),
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError::Relay(e)
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Relay(_) => "DELIVERY_FAILED",
            AppError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Relay(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Relay(e) = &self {
            tracing::warn!(error = %e, "relay error surfaced to HTTP caller");
        }
        ApiResponse::error(
            self.code(),
            &self.message(),
            uuid::Uuid::now_v7().to_string(),
            0,
        )
        .into_response()
    }
}
