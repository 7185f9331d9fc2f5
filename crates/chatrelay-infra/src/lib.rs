//! Infrastructure layer for chatrelay.
//!
//! Implements the collaborator traits defined in `chatrelay-core`: the
//! OpenAI-compatible completion client and the console reply sink. Also
//! loads `config.toml` and resolves the completion API key.

pub mod config;
pub mod llm;
pub mod transport;
