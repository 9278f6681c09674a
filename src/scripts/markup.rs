use scraper::{ElementRef, Html, Selector, node::Node};
use std::sync::LazyLock;

use crate::render::{ContentItem, Span, SpanStyle};
use crate::text::collapse_whitespace;

static SCRIPT_BODY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.space-y-6").expect("Failed to compile script body selector")
});
static SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span").expect("Failed to compile span selector"));

/// Parses the formatted script markup produced by the web client into
/// headers and styled paragraphs. Content is read from the children of the
/// `div.space-y-6` container, or from the top level of the fragment when the
/// container is missing. Other elements are ignored.
pub fn parse_script_markup(markup: &str) -> Vec<ContentItem> {
    let fragment = Html::parse_fragment(markup);
    let container = fragment
        .select(&SCRIPT_BODY)
        .next()
        .unwrap_or_else(|| fragment.root_element());

    container
        .children()
        .filter_map(ElementRef::wrap)
        .filter_map(|element| match element.value().name() {
            "h3" => header(element),
            "p" => paragraph(element),
            _ => None,
        })
        .collect()
}

/// Header text is the last `span` of the heading (the first one is the
/// decorative bullet), falling back to the heading's own text.
fn header(element: ElementRef<'_>) -> Option<ContentItem> {
    let text = match element.select(&SPAN).last() {
        Some(span) => span.text().collect::<String>(),
        None => element.text().collect::<String>(),
    };
    let text = collapse_whitespace(&text);
    (!text.is_empty()).then_some(ContentItem::Header(text))
}

fn paragraph(element: ElementRef<'_>) -> Option<ContentItem> {
    let mut spans: Vec<Span> = Vec::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => push(&mut spans, squash_whitespace(text), SpanStyle::Plain),
            Node::Element(el) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let text = squash_whitespace(&child_el.text().collect::<String>());
                match el.name() {
                    "br" => push(&mut spans, "\n".to_string(), SpanStyle::Plain),
                    "strong" | "b" => push(&mut spans, text, SpanStyle::Bold),
                    "i" | "em" => push(&mut spans, text, SpanStyle::Italic),
                    _ => push(&mut spans, text, SpanStyle::Plain),
                }
            }
            _ => {}
        }
    }

    trim_edges(&mut spans);
    if spans.iter().all(|span| span.text.trim().is_empty()) {
        return None;
    }
    Some(ContentItem::Paragraph(spans))
}

/// Appends text, merging it into the previous span when the style matches.
fn push(spans: &mut Vec<Span>, text: String, style: SpanStyle) {
    if text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.style == style => last.text.push_str(&text),
        _ => spans.push(Span::new(text, style)),
    }
}

/// Collapses whitespace runs, including markup indentation and newlines, to
/// single spaces while keeping a space at either edge if one was there.
fn squash_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn trim_edges(spans: &mut Vec<Span>) {
    if let Some(first) = spans.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = spans.last_mut() {
        last.text = last.text.trim_end_matches(' ').to_string();
    }
    spans.retain(|span| !span.text.is_empty());
}
