use bytes::Bytes;
use std::path::Path;
use tempfile::TempPath;

/// Extensions accepted for upload, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["txt", "pdf", "png", "jpg", "jpeg"];

/// A file received with a generation request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Lower-cased extension, if the filename has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    /// How the upload will be processed; `None` for disallowed extensions.
    pub fn kind(&self) -> Option<UploadKind> {
        UploadKind::from_extension(&self.extension()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Text,
    Pdf,
    Image,
}

impl UploadKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Where extracted text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// A plain text upload, passed through verbatim.
    Upload,
    Pdf,
    Ocr,
}

impl Provenance {
    /// Label prepended when the text is folded into the prompt context.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Provenance::Upload => None,
            Provenance::Pdf => Some("PDF Extract:"),
            Provenance::Ocr => Some("OCR Extract:"),
        }
    }
}

/// Outcome of processing one upload.
#[derive(Debug)]
pub enum ExtractionResult {
    Text { provenance: Provenance, text: String },
    /// The raw image could not be turned into text and should be forwarded
    /// as-is. The scratch file is deleted when this value is dropped.
    ImagePath(TempPath),
    Unavailable,
}

impl ExtractionResult {
    /// The extracted text with its provenance label, or `None` when there is
    /// nothing worth adding to the prompt.
    pub fn labelled_text(&self) -> Option<String> {
        let ExtractionResult::Text { provenance, text } = self else {
            return None;
        };
        if text.trim().is_empty() {
            return None;
        }
        Some(match provenance.label() {
            Some(label) => format!("{label}\n{text}"),
            None => text.clone(),
        })
    }

    pub fn image_path(&self) -> Option<&Path> {
        match self {
            ExtractionResult::ImagePath(path) => Some(&**path),
            _ => None,
        }
    }
}
