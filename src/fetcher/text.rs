use scraper::{Html, node::Node};

use crate::text::collapse_whitespace;

/// Elements whose contents never count as visible text.
const STRIPPED_ELEMENTS: [&str; 4] = ["script", "style", "meta", "link"];

/// Extracts the visible text of an HTML document: every text node outside
/// the stripped elements, whitespace-collapsed, joined with single spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut pieces: Vec<String> = Vec::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| STRIPPED_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let piece = collapse_whitespace(text);
        if !piece.is_empty() {
            pieces.push(piece);
        }
    }

    pieces.join(" ")
}
