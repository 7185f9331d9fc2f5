//! Request-text composition.
//!
//! The request sent upstream is the user's stored context followed by the
//! new message. Length limits are counted in characters and applied here,
//! never when the context is stored.

/// Default hard cap on the prompt sent upstream, in characters.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 4000;

/// Strip surrounding whitespace (including newlines) from a user message.
pub fn clean_user_text(text: &str) -> &str {
    text.trim()
}

/// Concatenate stored context and the new, cleaned message.
pub fn compose_request(context: &str, text: &str) -> String {
    let text = clean_user_text(text);
    let mut request = String::with_capacity(context.len() + text.len());
    request.push_str(context);
    request.push_str(text);
    request
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
