//! Business logic for chatrelay.
//!
//! Holds the per-user caches (session context and usage quota), the prompt
//! and reply builders, the admin command, and the `MessagePipeline` that ties
//! them together. Collaborators (completion service, reply sink, roster) are
//! traits here; concrete adapters live in `chatrelay-infra` and `chatrelay-api`.

pub mod admin;
pub mod cache;
pub mod clock;
pub mod completion;
pub mod pipeline;
pub mod prompt;
pub mod quota;
pub mod reply;
pub mod session;
pub mod sweeper;
pub mod transport;
