use std::sync::Mutex;

use chatrelay_core::transport::ReplySink;
use chatrelay_types::error::TransportError;

/// Collects replies in memory.
#[derive(Debug, Default)]
pub struct BufferedSink {
    replies: Mutex<Vec<String>>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything sent so far, leaving the buffer empty.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.replies.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl ReplySink for BufferedSink {
    async fn send_reply(&self, text: &str) -> Result<(), TransportError> {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        Ok(())
    }
}
