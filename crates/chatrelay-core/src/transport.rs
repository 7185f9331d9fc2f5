//! Chat-transport traits.
//!
//! The transport owns login and delivery; the relay only needs to answer the
//! message it was handed and, for the admin command, enumerate contacts.

use chatrelay_types::error::TransportError;
use chatrelay_types::message::Friend;

/// Delivers the reply for one inbound message.
pub trait ReplySink: Send + Sync {
    fn send_reply(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}

/// Enumerates the contacts of the logged-in account.
pub trait Roster: Send + Sync {
    fn list_friends(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Friend>, TransportError>> + Send;
}

/// A roster backed by a fixed list of contacts.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    friends: Vec<Friend>,
}

impl StaticRoster {
    pub fn new(friends: Vec<Friend>) -> Self {
        Self { friends }
    }
}

impl Roster for StaticRoster {
    async fn list_friends(&self) -> Result<Vec<Friend>, TransportError> {
        Ok(self.friends.clone())
    }
}
