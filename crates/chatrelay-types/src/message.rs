//! Inbound message, roster, and outcome types.
//!
//! These model one message arriving from a chat participant, the friend
//! list the transport can enumerate, and what the relay did with it.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Content type of an inbound chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Voice,
    Other,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Image => write!(f, "image"),
            MessageKind::Voice => write!(f, "voice"),
            MessageKind::Other => write!(f, "other"),
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "voice" => Ok(MessageKind::Voice),
            "other" => Ok(MessageKind::Other),
            other => Err(format!("invalid message kind: '{other}'")),
        }
    }
}

impl Default for MessageKind {
    fn default() -> Self {
        MessageKind::Text
    }
}

/// A single message received from a chat participant.
///
/// `sender_id` is the stable user key both caches are keyed by;
/// `sender_name` is the display name, used only for the admin check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub sender_id: String,
    pub sender_name: String,
    #[serde(default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub text: String,
}

impl InboundMessage {
    /// Build a text message.
    pub fn text(
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            kind: MessageKind::Text,
            text: text.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == MessageKind::Text
    }
}

/// A contact the transport can enumerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub user_id: String,
    pub display_name: String,
}

/// What the pipeline did with one inbound message.
///
/// Every variant except `Skipped` corresponds to exactly one reply sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HandleOutcome {
    /// Non-text message or empty request text. Nothing was sent.
    Skipped,
    /// Admin cache-clear ran. `cleared` counts matched roster entries.
    AdminCleared {
        target: Option<String>,
        cleared: usize,
    },
    /// The sender is out of quota for the current window.
    QuotaExceeded { count: u32 },
    /// The completion call failed and the user was told why.
    UpstreamFailed,
    /// A completion was relayed. `used` is the sender's count after this call.
    Replied { used: u32 },
}

impl HandleOutcome {
    /// Whether a reply was sent for this outcome.
    pub fn replied(&self) -> bool {
        !matches!(self, HandleOutcome::Skipped)
    }
}
