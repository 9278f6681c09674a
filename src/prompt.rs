//! Combines the user's prompt with optional file and URL context into the
//! text sent to the model.

use crate::text::{ELLIPSIS, char_len, truncate_chars};

/// Upper bound for the rendered user text whenever the prompt itself fits.
pub const MAX_PROMPT_CHARS: usize = 4000;
/// Extracted file text kept before it is folded into the context.
pub const MAX_FILE_CHARS: usize = 4000;
/// Share of the context allowed for each of the file and URL sections.
pub const MAX_SECTION_CHARS: usize = 2000;
/// Headroom left below [`MAX_PROMPT_CHARS`] when the context has to be cut.
const CONTEXT_SLACK: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub prompt: String,
    pub additional_context: String,
}

impl AssembledPrompt {
    /// The user turn as sent to the model. The context header is omitted
    /// when there is no context.
    pub fn user_text(&self) -> String {
        render(&self.prompt, &self.additional_context)
    }
}

fn render(prompt: &str, context: &str) -> String {
    if context.trim().is_empty() {
        prompt.trim().to_string()
    } else {
        format!("{prompt}\n\nAdditional Context:\n{context}")
            .trim()
            .to_string()
    }
}

/// Builds the prompt. `file_text` is expected to be already labelled with
/// its provenance. Blank file text is ignored.
pub fn assemble(prompt: &str, file_text: Option<&str>, url_context: Option<&str>) -> AssembledPrompt {
    let mut context = String::new();

    if let Some(file) = file_text.filter(|text| !text.trim().is_empty()) {
        let file = truncate_chars(file, MAX_FILE_CHARS);
        context.push_str("File Content:\n");
        context.push_str(truncate_chars(file, MAX_SECTION_CHARS));
        context.push_str("\n\n");
    }

    if let Some(url) = url_context.filter(|text| !text.trim().is_empty()) {
        context.push_str(truncate_chars(url, MAX_SECTION_CHARS));
        context.push_str("\n\n");
    }

    if char_len(&render(prompt, &context)) > MAX_PROMPT_CHARS {
        let budget = MAX_PROMPT_CHARS as isize - char_len(prompt) as isize - CONTEXT_SLACK as isize;
        context = if budget > 0 {
            format!("{}{ELLIPSIS}", truncate_chars(&context, budget as usize))
        } else {
            String::new()
        };
    }

    AssembledPrompt {
        prompt: prompt.to_string(),
        additional_context: context,
    }
}
