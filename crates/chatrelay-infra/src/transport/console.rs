//! Line-oriented console transport.

use std::io::ErrorKind;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use chatrelay_core::transport::ReplySink;
use chatrelay_types::error::TransportError;

/// Writes each reply to `out`, one per block, prefixed with a speaker label.
///
/// Multi-line replies keep their line breaks; a blank line separates
/// consecutive replies.
pub struct ConsoleSink<W> {
    label: String,
    out: Mutex<W>,
}

impl ConsoleSink<tokio::io::Stdout> {
    pub fn stdout(label: impl Into<String>) -> Self {
        Self::new(label, tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> ConsoleSink<W> {
    pub fn new(label: impl Into<String>, out: W) -> Self {
        Self {
            label: label.into(),
            out: Mutex::new(out),
        }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    async fn write_reply(&self, text: &str) -> std::io::Result<()> {
        let block = format!("{}> {}\n\n", self.label, text);
        let mut out = self.out.lock().await;
        out.write_all(block.as_bytes()).await?;
        out.flush().await
    }
}

impl<W: AsyncWrite + Unpin + Send> ReplySink for ConsoleSink<W> {
    async fn send_reply(&self, text: &str) -> Result<(), TransportError> {
        self.write_reply(text).await.map_err(|e| match e.kind() {
            ErrorKind::BrokenPipe => TransportError::Closed,
            _ => TransportError::Send(e.to_string()),
        })
    }
}
