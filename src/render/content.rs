use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStyle {
    Plain,
    Bold,
    Italic,
}

/// A run of paragraph text sharing one style. May contain `\n` for explicit
/// line breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SpanStyle::Plain)
    }
}

/// One block of a script document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum ContentItem {
    Header(String),
    Paragraph(Vec<Span>),
}

impl ContentItem {
    /// The item's text with styling flattened away.
    pub fn plain_text(&self) -> String {
        match self {
            ContentItem::Header(text) => text.clone(),
            ContentItem::Paragraph(spans) => spans.iter().map(|span| span.text.as_str()).collect(),
        }
    }
}
