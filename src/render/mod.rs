pub mod content;
pub mod encoding;
pub mod layout;
pub mod metrics;

pub use content::{ContentItem, Span, SpanStyle};
pub use encoding::TextEncoding;
pub use layout::{FontFace, PageSetup};

use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use thiserror::Error;
use tracing::{instrument, warn};

use layout::{Align, Layout, MM, Run, wrap};

pub const DOCUMENT_TITLE: &str = "Generated Video Script";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf encoding error: {0}")]
    Encode(#[from] lopdf::Error),

    #[error("pdf write error: {0}")]
    Write(String),

    #[error("render task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Renders structured script content into a paginated PDF using the
/// built-in Helvetica fonts.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRenderer {
    setup: PageSetup,
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new(PageSetup::a4())
    }
}

impl DocumentRenderer {
    pub fn new(setup: PageSetup) -> Self {
        Self { setup }
    }

    /// Renders on the blocking pool, degrading to the plain layout when the
    /// styled one fails.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn render_document(
        &self,
        items: Vec<ContentItem>,
        generated_at: NaiveDateTime,
    ) -> Result<Vec<u8>, RenderError> {
        let renderer = *self;
        let items = std::sync::Arc::new(items);

        let styled_items = items.clone();
        let styled =
            tokio::task::spawn_blocking(move || renderer.render(&styled_items, generated_at)).await;

        match styled {
            Ok(Ok(bytes)) => return Ok(bytes),
            Ok(Err(e)) => warn!(error = %e, "styled rendering failed, using plain layout"),
            Err(e) => warn!(error = %e, "styled rendering aborted, using plain layout"),
        }

        tokio::task::spawn_blocking(move || renderer.render_fallback(&items)).await?
    }

    /// Title, timestamp, then every item with bold headers and styled
    /// paragraph spans. Characters outside WinAnsi are dropped.
    pub fn render(
        &self,
        items: &[ContentItem],
        generated_at: NaiveDateTime,
    ) -> Result<Vec<u8>, RenderError> {
        let setup = self.setup;
        let enc = TextEncoding::WinAnsi;
        let left = setup.margin;
        let width = setup.content_width();
        let mut layout = Layout::new(setup);

        layout.line(
            &single_run(DOCUMENT_TITLE, FontFace::Bold, enc),
            24.0,
            15.0 * MM,
            left,
            width,
            Align::Center,
            None,
        );
        layout.advance(5.0 * MM);

        let stamp = format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
        layout.line(
            &single_run(&stamp, FontFace::Italic, enc),
            11.0,
            8.0 * MM,
            left,
            width,
            Align::Right,
            Some(0.5),
        );
        layout.advance(10.0 * MM);

        for item in items {
            match item {
                ContentItem::Header(text) => {
                    let bullet = 6.0 * MM;
                    let line_height = 10.0 * MM;
                    let lines = wrap(
                        &[Span::new(text.as_str(), SpanStyle::Bold)],
                        enc,
                        14.0,
                        width - bullet,
                    );
                    for (idx, line) in lines.iter().enumerate() {
                        layout.ensure_room(line_height);
                        if idx == 0 {
                            layout.cell(
                                &single_run("-", FontFace::Bold, enc),
                                14.0,
                                line_height,
                                left,
                                bullet,
                                Align::Left,
                                None,
                            );
                        }
                        layout.line(
                            line,
                            14.0,
                            line_height,
                            left + bullet,
                            width - bullet,
                            Align::Left,
                            None,
                        );
                    }
                    layout.advance(2.0 * MM);
                }
                ContentItem::Paragraph(spans) => {
                    for line in wrap(spans, enc, 12.0, width) {
                        layout.line(&line, 12.0, 18.0, left, width, Align::Left, None);
                    }
                    layout.advance(4.0 * MM);
                }
            }
        }

        stamp_page_numbers(&mut layout, enc);
        assemble(setup, layout.into_pages())
    }

    /// Bold title followed by each item's plain ASCII text.
    pub fn render_fallback(&self, items: &[ContentItem]) -> Result<Vec<u8>, RenderError> {
        let setup = self.setup;
        let enc = TextEncoding::Ascii;
        let left = setup.margin;
        let width = setup.content_width();
        let mut layout = Layout::new(setup);

        layout.line(
            &single_run(DOCUMENT_TITLE, FontFace::Bold, enc),
            16.0,
            10.0 * MM,
            left,
            width,
            Align::Left,
            None,
        );
        layout.advance(5.0 * MM);

        for item in items {
            for line in wrap(&[Span::plain(item.plain_text())], enc, 12.0, width) {
                layout.line(&line, 12.0, 18.0, left, width, Align::Left, None);
            }
            layout.advance(2.0 * MM);
        }

        assemble(setup, layout.into_pages())
    }
}

fn single_run(text: &str, face: FontFace, enc: TextEncoding) -> Vec<Run> {
    vec![Run {
        face,
        bytes: enc.encode(text),
    }]
}

fn stamp_page_numbers(layout: &mut Layout, enc: TextEncoding) {
    let setup = layout.setup();
    let total = layout.page_count();
    let top = setup.height - setup.margin - setup.footer_band;
    for page in 0..total {
        let footer = single_run(&format!("Page {}/{}", page + 1, total), FontFace::Italic, enc);
        layout.stamp(page, &footer, 8.0, top, setup.footer_band, Align::Center);
    }
}

fn assemble(setup: PageSetup, pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(setup.width),
                Object::Real(setup.height),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| RenderError::Write(e.to_string()))?;
    Ok(out)
}
