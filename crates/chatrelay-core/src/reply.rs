//! Reply formatting and the fixed user-facing notices.

use chrono::Duration;

/// Sent when the completion reply is empty after cleanup.
pub const NO_MEANINGFUL_ANSWER: &str = "请求得不到任何有意义的回复，请具体提出问题。";

/// Format a raw completion for the user.
///
/// If the reply has more than one blank-line separated paragraph, the first
/// one is dropped (completion services tend to open with a preamble). The
/// rest is trimmed, replaced with [`NO_MEANINGFUL_ANSWER`] if empty, and
/// prefixed with `prefix` on its own line when `prefix` is non-empty.
pub fn build_reply(raw: &str, prefix: &str) -> String {
    // Also drops a first paragraph that is the real answer.
    let body = match raw.split_once("\n\n") {
        Some((_, rest)) => rest,
        None => raw,
    };

    let body = body.trim();
    let body = if body.is_empty() {
        NO_MEANINGFUL_ANSWER
    } else {
        body
    };

    format!("{prefix}\n{body}").trim_matches('\n').to_string()
}

/// Notice sent to a user whose quota for the window is used up.
pub fn quota_exceeded_notice(limit: u32, window: Duration) -> String {
    format!(
        "感谢您的体验，每位用户{}内可体验{}次，到期后自动重置",
        describe_window(window),
        limit
    )
}

/// Notice sent to a user when the completion call fails.
pub fn upstream_failure_notice(error: &impl std::fmt::Display) -> String {
    format!("completion request error: {error}")
}

fn describe_window(window: Duration) -> String {
    let secs = window.num_seconds().max(0);
    if secs > 0 && secs % 3600 == 0 {
        format!("{}小时", secs / 3600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{}分钟", secs / 60)
    } else {
        format!("{secs}秒")
    }
}
