use lopdf::{Object, content::Operation};

use crate::render::content::{Span, SpanStyle};
use crate::render::encoding::TextEncoding;
use crate::render::metrics::text_width;

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Band above the bottom margin kept free for the page footer.
    pub footer_band: f32,
}

impl PageSetup {
    pub fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 20.0 * MM,
            footer_band: 10.0 * MM,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest point (distance from the top edge) body text may reach.
    fn content_bottom(&self) -> f32 {
        self.height - self.margin - self.footer_band
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

impl FontFace {
    pub const ALL: [FontFace; 3] = [FontFace::Regular, FontFace::Bold, FontFace::Italic];

    /// Name of the font in the page resources.
    pub fn resource(&self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Italic => "F3",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Italic => "Helvetica-Oblique",
        }
    }
}

impl From<SpanStyle> for FontFace {
    fn from(style: SpanStyle) -> Self {
        match style {
            SpanStyle::Plain => FontFace::Regular,
            SpanStyle::Bold => FontFace::Bold,
            SpanStyle::Italic => FontFace::Italic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Encoded text drawn in one face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub face: FontFace,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Word {
    face: FontFace,
    bytes: Vec<u8>,
    leading_space: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(Word),
    Break,
}

/// Splits styled spans into words, remembering where whitespace separated
/// them and where explicit line breaks occur. Words that encode to nothing
/// are dropped.
fn tokenize(spans: &[Span], encoding: TextEncoding) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pending_space = false;

    for span in spans {
        let face = FontFace::from(span.style);
        for (line_idx, segment) in span.text.split('\n').enumerate() {
            if line_idx > 0 {
                tokens.push(Token::Break);
                pending_space = false;
            }
            let mut word = String::new();
            for c in segment.chars() {
                if c.is_whitespace() {
                    if !word.is_empty() {
                        push_word(&mut tokens, &mut word, face, pending_space, encoding);
                    }
                    pending_space = true;
                } else {
                    word.push(c);
                }
            }
            if !word.is_empty() {
                push_word(&mut tokens, &mut word, face, pending_space, encoding);
                pending_space = false;
            }
        }
    }

    tokens
}

fn push_word(
    tokens: &mut Vec<Token>,
    word: &mut String,
    face: FontFace,
    leading_space: bool,
    encoding: TextEncoding,
) {
    let bytes = encoding.encode(word);
    word.clear();
    if !bytes.is_empty() {
        tokens.push(Token::Word(Word {
            face,
            bytes,
            leading_space,
        }));
    }
}

/// Greedy word wrap. Words wider than a whole line are split by glyph.
pub fn wrap(spans: &[Span], encoding: TextEncoding, size: f32, max_width: f32) -> Vec<Vec<Run>> {
    let mut lines: Vec<Vec<Run>> = Vec::new();
    let mut line: Vec<Run> = Vec::new();
    let mut line_width = 0.0_f32;

    for token in tokenize(spans, encoding) {
        let word = match token {
            Token::Break => {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
                continue;
            }
            Token::Word(word) => word,
        };

        let word_width = text_width(&word.bytes, word.face, size);
        let space_width = if word.leading_space && !line.is_empty() {
            text_width(b" ", word.face, size)
        } else {
            0.0
        };

        if !line.is_empty() && line_width + space_width + word_width > max_width {
            lines.push(std::mem::take(&mut line));
            line_width = 0.0;
        }

        if line.is_empty() && word_width > max_width {
            for chunk in split_to_width(&word.bytes, word.face, size, max_width) {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                line_width = text_width(&chunk, word.face, size);
                append(&mut line, word.face, &chunk, false);
            }
            continue;
        }

        let with_space = word.leading_space && !line.is_empty();
        line_width += if with_space { space_width } else { 0.0 } + word_width;
        append(&mut line, word.face, &word.bytes, with_space);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn split_to_width(bytes: &[u8], face: FontFace, size: f32, max_width: f32) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut chunk = Vec::new();
    for &b in bytes {
        chunk.push(b);
        if chunk.len() > 1 && text_width(&chunk, face, size) > max_width {
            chunk.pop();
            chunks.push(std::mem::take(&mut chunk));
            chunk.push(b);
        }
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}

fn append(line: &mut Vec<Run>, face: FontFace, bytes: &[u8], with_space: bool) {
    match line.last_mut() {
        Some(run) if run.face == face => {
            if with_space {
                run.bytes.push(b' ');
            }
            run.bytes.extend_from_slice(bytes);
        }
        _ => {
            let mut run_bytes = Vec::with_capacity(bytes.len() + 1);
            if with_space {
                run_bytes.push(b' ');
            }
            run_bytes.extend_from_slice(bytes);
            line.push(Run {
                face,
                bytes: run_bytes,
            });
        }
    }
}

pub fn runs_width(runs: &[Run], size: f32) -> f32 {
    runs.iter()
        .map(|run| text_width(&run.bytes, run.face, size))
        .sum()
}

/// Accumulates page content streams top-down, breaking pages automatically.
pub struct Layout {
    setup: PageSetup,
    pages: Vec<Vec<Operation>>,
    /// Distance of the cursor from the top edge of the current page.
    y: f32,
}

impl Layout {
    pub fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            pages: vec![Vec::new()],
            y: setup.margin,
        }
    }

    pub fn setup(&self) -> PageSetup {
        self.setup
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = self.setup.margin;
    }

    /// Starts a new page when `height` no longer fits above the footer band.
    pub fn ensure_room(&mut self, height: f32) {
        if self.y + height > self.setup.content_bottom() && self.y > self.setup.margin {
            self.new_page();
        }
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    /// Draws one line of runs inside a cell of `height` at the cursor, then
    /// moves the cursor below the cell.
    #[allow(clippy::too_many_arguments)]
    pub fn line(
        &mut self,
        runs: &[Run],
        size: f32,
        height: f32,
        x: f32,
        width: f32,
        align: Align,
        gray: Option<f32>,
    ) {
        self.ensure_room(height);
        self.cell(runs, size, height, x, width, align, gray);
        self.y += height;
    }

    /// Draws a cell at the cursor without moving it.
    #[allow(clippy::too_many_arguments)]
    pub fn cell(
        &mut self,
        runs: &[Run],
        size: f32,
        height: f32,
        x: f32,
        width: f32,
        align: Align,
        gray: Option<f32>,
    ) {
        let ops = text_ops(self.setup, runs, size, self.y, height, x, width, align, gray);
        if let Some(page) = self.pages.last_mut() {
            page.extend(ops);
        }
    }

    /// Writes text into a cell on an already laid out page without moving
    /// the cursor. Used for footers once the page count is known.
    pub fn stamp(
        &mut self,
        page: usize,
        runs: &[Run],
        size: f32,
        top: f32,
        height: f32,
        align: Align,
    ) {
        let setup = self.setup;
        let ops = text_ops(
            setup,
            runs,
            size,
            top,
            height,
            setup.margin,
            setup.content_width(),
            align,
            None,
        );
        if let Some(ops_for_page) = self.pages.get_mut(page) {
            ops_for_page.extend(ops);
        }
    }

    pub fn into_pages(self) -> Vec<Vec<Operation>> {
        self.pages
    }
}

#[allow(clippy::too_many_arguments)]
fn text_ops(
    setup: PageSetup,
    runs: &[Run],
    size: f32,
    top: f32,
    height: f32,
    x: f32,
    width: f32,
    align: Align,
    gray: Option<f32>,
) -> Vec<Operation> {
    if runs.iter().all(|run| run.bytes.is_empty()) {
        return Vec::new();
    }

    let line_width = runs_width(runs, size);
    let left = match align {
        Align::Left => x,
        Align::Center => x + (width - line_width) / 2.0,
        Align::Right => x + width - line_width,
    };
    // baseline sits just below the vertical centre of the cell
    let baseline = setup.height - (top + height / 2.0 + 0.3 * size);

    let mut ops = Vec::with_capacity(runs.len() * 2 + 5);
    if let Some(level) = gray {
        ops.push(Operation::new("g", vec![Object::Real(level)]));
    }
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Td",
        vec![Object::Real(left), Object::Real(baseline)],
    ));
    for run in runs.iter().filter(|run| !run.bytes.is_empty()) {
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(run.face.resource().as_bytes().to_vec()),
                Object::Real(size),
            ],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(run.bytes.clone())],
        ));
    }
    ops.push(Operation::new("ET", vec![]));
    if gray.is_some() {
        ops.push(Operation::new("g", vec![Object::Real(0.0)]));
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &[Run]) -> String {
        line.iter()
            .map(|run| String::from_utf8_lossy(&run.bytes).into_owned())
            .collect()
    }

    #[test]
    fn wrap_keeps_spacing_across_styles() {
        let spans = vec![
            Span::plain("Lift-off at "),
            Span::new("dawn", SpanStyle::Bold),
            Span::plain(", then "),
            Span::new("orbit", SpanStyle::Italic),
            Span::plain("."),
        ];
        let lines = wrap(&spans, TextEncoding::WinAnsi, 12.0, 1000.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "Lift-off at dawn, then orbit.");
        let faces: Vec<FontFace> = lines[0].iter().map(|run| run.face).collect();
        assert_eq!(
            faces,
            vec![
                FontFace::Regular,
                FontFace::Bold,
                FontFace::Regular,
                FontFace::Italic,
                FontFace::Regular
            ]
        );
    }

    #[test]
    fn wrap_breaks_long_text_within_width() {
        let text = "word ".repeat(200);
        let lines = wrap(&[Span::plain(text)], TextEncoding::WinAnsi, 12.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(runs_width(line, 12.0) <= 200.0);
        }
    }

    #[test]
    fn wrap_honours_explicit_breaks_and_splits_huge_words() {
        let lines = wrap(&[Span::plain("first\nsecond")], TextEncoding::WinAnsi, 12.0, 500.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[1]), "second");

        let huge = "x".repeat(500);
        let lines = wrap(&[Span::plain(huge)], TextEncoding::WinAnsi, 12.0, 100.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| runs_width(line, 12.0) <= 100.0));
    }

    #[test]
    fn unencodable_words_vanish() {
        let lines = wrap(&[Span::plain("日本語")], TextEncoding::WinAnsi, 12.0, 500.0);
        assert!(lines.is_empty());
    }

    #[test]
    fn layout_breaks_pages_at_bottom() {
        let setup = PageSetup::a4();
        let mut layout = Layout::new(setup);
        let runs = vec![Run {
            face: FontFace::Regular,
            bytes: b"line".to_vec(),
        }];
        for _ in 0..100 {
            layout.line(&runs, 12.0, 18.0, setup.margin, setup.content_width(), Align::Left, None);
        }
        assert!(layout.page_count() > 1);
    }
}
