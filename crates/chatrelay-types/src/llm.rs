//! Completion-service error type.
//!
//! The relay treats the completion service as an opaque `prompt -> text`
//! call. Every way that call can fail is folded into [`LlmError`] so the
//! pipeline can report it to the user verbatim.

/// Errors from completion-service calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("context length exceeded")]
    ContextLengthExceeded,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },
}
