//! `chatrelay console`: a terminal transport for local use.
//!
//! Each stdin line is one inbound text message from the configured sender.
//! Replies go to stdout; logs go to stderr.

use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use chatrelay_core::completion::CompletionService;
use chatrelay_core::transport::ReplySink;
use chatrelay_types::message::{HandleOutcome, InboundMessage};

use crate::state::AppState;

/// Identity the console user speaks as.
#[derive(Debug, Clone)]
pub struct ConsoleSender {
    pub id: String,
    pub name: String,
}

/// Relay lines from `input` until EOF, replying through `sink`.
///
/// Returns the number of messages that produced a reply.
pub async fn run_console<C, R, S>(
    state: &AppState<C>,
    sender: &ConsoleSender,
    input: R,
    sink: &S,
) -> Result<usize>
where
    C: CompletionService + 'static,
    R: AsyncBufRead + Unpin,
    S: ReplySink,
{
    let mut lines = input.lines();
    let mut replied = 0;

    while let Some(line) = lines.next_line().await? {
        let message = InboundMessage::text(&sender.id, &sender.name, line);
        match state.pipeline.handle(&message, sink).await {
            Ok(outcome) => {
                if outcome.replied() {
                    replied += 1;
                }
                if let HandleOutcome::QuotaExceeded { count } = outcome {
                    tracing::debug!(count, "console sender is out of quota");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to deliver console reply"),
        }
    }

    Ok(replied)
}

/// Banner printed before reading input.
pub fn print_banner(sender: &ConsoleSender, limit: u32) {
    eprintln!();
    eprintln!(
        "  {} chatrelay console as {}",
        style("⚡").bold(),
        style(&sender.name).cyan()
    );
    eprintln!(
        "  {}",
        style(format!("{limit} completions per window. Ctrl+D to quit.")).dim()
    );
    eprintln!();
}
