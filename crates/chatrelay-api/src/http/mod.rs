//! HTTP webhook transport for chatrelay.
//!
//! Axum-based API at `/api/v1/` with the envelope response format and CORS
//! support. A chat gateway posts each inbound message and gets the relay's
//! reply back in the response body.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
