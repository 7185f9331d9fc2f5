use thiserror::Error;

/// Errors raised by a chat transport (reply delivery, roster lookup).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("send failed: {0}")]
    Send(String),

    #[error("roster unavailable: {0}")]
    Roster(String),

    #[error("transport closed")]
    Closed,
}

/// Errors returned by the message pipeline to its caller.
///
/// Quota and upstream failures are normally terminated locally by telling
/// the user; they only surface here when that notice could not be sent.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("quota exhausted after {count} uses and the notice could not be delivered: {source}")]
    QuotaNotice {
        count: u32,
        #[source]
        source: TransportError,
    },

    #[error("completion failed ({upstream}) and the notice could not be delivered: {source}")]
    UpstreamNotice {
        upstream: String,
        #[source]
        source: TransportError,
    },

    #[error("reply delivery failed: {0}")]
    Delivery(#[source] TransportError),
}

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("environment variable '{0}' is not set")]
    MissingApiKey(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
