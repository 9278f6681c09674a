//! Character-counted string helpers shared by the fetcher, the prompt
//! assembler and the store. Lengths are Unicode scalar values, never bytes.

pub const ELLIPSIS: &str = "...";

/// Returns the prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Truncates to `max_chars` and appends `...` when anything was cut off.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() == text.len() {
        text.to_string()
    } else {
        format!("{head}{ELLIPSIS}")
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Collapses every whitespace run into a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
