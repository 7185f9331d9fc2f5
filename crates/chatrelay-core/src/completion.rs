//! CompletionService trait definition.
//!
//! The relay treats the upstream text-completion service as an opaque
//! `prompt -> text` call. Uses RPITIT (native async fn in traits, Rust 2024
//! edition). Implementations live in chatrelay-infra.

use chatrelay_types::llm::LlmError;

/// Trait for text-completion backends.
///
/// Implementations are expected to apply their own request timeout and
/// report it as [`LlmError::Timeout`].
pub trait CompletionService: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw completion text.
    fn complete(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}
