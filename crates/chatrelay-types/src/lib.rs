//! Shared domain types for chatrelay.
//!
//! This crate contains the types passed between the relay core, the transport
//! adapters and the completion client: inbound messages, roster entries,
//! handling outcomes, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod message;
