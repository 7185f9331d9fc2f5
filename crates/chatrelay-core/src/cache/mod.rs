//! Expiring in-memory caches shared across message handlers.

pub mod ttl;

pub use ttl::TtlCache;
