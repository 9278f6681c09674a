use crate::text::{ELLIPSIS, char_len, truncate_chars};

pub const UNTITLED: &str = "Untitled Script";

const SENTENCE_ENDINGS: [&str; 7] = [". ", "! ", "? ", "... ", "। ", "॥ ", "؟ "];
const LABEL_PREFIXES: [&str; 4] = ["Introduction:", "Intro:", "Title:", "Topic:"];

const MAX_TITLE_CHARS: usize = 100;
const MIN_TITLE_CHARS: usize = 3;
const SHORT_TITLE_FALLBACK_CHARS: usize = 50;

/// Derives a display title from the first line of a script: its first
/// sentence, without a leading label, at most 100 characters. Never fails.
pub fn extract_title(raw: &str) -> String {
    let cleaned = raw.replace(['\n', '\r'], " ");
    let cleaned = cleaned.trim();

    let first_end = SENTENCE_ENDINGS
        .iter()
        .filter_map(|ending| cleaned.find(ending))
        .min();

    let mut title = match first_end {
        Some(end) => cleaned[..end].trim(),
        // unterminated text is cut by the final length cap below
        None => cleaned,
    };

    for prefix in LABEL_PREFIXES {
        if let Some(rest) = title.strip_prefix(prefix) {
            title = rest.trim();
        }
    }

    if char_len(title) < MIN_TITLE_CHARS {
        title = truncate_chars(cleaned, SHORT_TITLE_FALLBACK_CHARS).trim();
    }

    let title = if char_len(title) > MAX_TITLE_CHARS {
        format!(
            "{}{ELLIPSIS}",
            truncate_chars(title, MAX_TITLE_CHARS - ELLIPSIS.len())
        )
    } else {
        title.to_string()
    };

    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sentence_becomes_title() {
        assert_eq!(extract_title("Hello world. This is a script"), "Hello world");
        assert_eq!(extract_title("Wow! What a day."), "Wow");
        assert_eq!(extract_title("Ready? Let's go."), "Ready");
    }

    #[test]
    fn earliest_terminator_wins_across_scripts() {
        assert_eq!(extract_title("नमस्ते दुनिया। यह एक स्क्रिप्ट है"), "नमस्ते दुनिया");
        assert_eq!(extract_title("مرحبا؟ نعم"), "مرحبا");
        assert_eq!(extract_title("Wait for it... and then. Done"), "Wait for it");
    }

    #[test]
    fn empty_input_is_untitled() {
        assert_eq!(extract_title(""), UNTITLED);
        assert_eq!(extract_title("  \n\r "), UNTITLED);
    }

    #[test]
    fn line_breaks_become_spaces() {
        assert_eq!(extract_title("Line one\nline two"), "Line one line two");
    }

    #[test]
    fn label_prefixes_are_stripped() {
        assert_eq!(extract_title("Title: The Ocean Deep. More text"), "The Ocean Deep");
        assert_eq!(extract_title("Intro: Welcome back"), "Welcome back");
        assert_eq!(extract_title("Introduction: Our story. Begins"), "Our story");
    }

    #[test]
    fn too_short_titles_fall_back_to_opening_text() {
        assert_eq!(extract_title("A. Bee story begins here"), "A. Bee story begins here");
        assert_eq!(extract_title("Title: . Rest"), "Title: . Rest");
    }

    #[test]
    fn unterminated_text_is_capped_at_100_chars() {
        let title = extract_title(&"a".repeat(200));
        assert_eq!(title, format!("{}...", "a".repeat(97)));
    }

    #[test]
    fn long_first_sentence_is_shortened() {
        let raw = format!("{}. Second sentence", "b".repeat(150));
        let title = extract_title(&raw);
        assert_eq!(char_len(&title), 100);
        assert!(title.ends_with("..."));
    }
}
