use lopdf::Document;
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// Extracts the text of every page, pages separated by newlines. Any read or
/// parse failure (including a panic inside the parser) yields empty text.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn extract_pdf_text(path: &Path) -> String {
    let owned: PathBuf = path.to_path_buf();
    match tokio::task::spawn_blocking(move || read_pages(&owned)).await {
        Ok(Ok(text)) => {
            debug!(chars = text.chars().count(), "extracted PDF text");
            text
        }
        Ok(Err(e)) => {
            error!(error = %e, "error in PDF processing");
            String::new()
        }
        Err(join_error) => {
            error!(error = %join_error, "PDF parser aborted");
            String::new()
        }
    }
}

fn read_pages(path: &Path) -> Result<String, lopdf::Error> {
    let document = Document::load(path)?;

    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        text.push_str(&document.extract_text(&[*page_number])?);
        text.push('\n');
    }

    Ok(text.trim().to_string())
}
