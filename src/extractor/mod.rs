pub mod imaging;
pub mod model;
pub mod ocr;
pub mod pdf;

#[cfg(test)]
mod tests;

pub use imaging::{ImageRejection, OcrOutcome};
pub use model::{ExtractionResult, Provenance, UploadKind, UploadedFile};
pub use ocr::{OcrEngine, OcrError, TesseractOcr};

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Error)]
enum ScratchError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scratch writer aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Turns uploads into prompt context. Uploads are staged in `upload_dir`
/// under unique names and removed once they are no longer needed.
pub struct ContentExtractor {
    upload_dir: PathBuf,
    ocr: Arc<dyn OcrEngine>,
}

impl ContentExtractor {
    pub fn new(upload_dir: impl Into<PathBuf>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            ocr,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn ocr(&self) -> &dyn OcrEngine {
        self.ocr.as_ref()
    }

    #[instrument(skip_all, fields(filename = %upload.filename, bytes = upload.bytes.len()))]
    pub async fn extract(&self, upload: &UploadedFile) -> ExtractionResult {
        let Some(kind) = upload.kind() else {
            warn!("invalid file or filename");
            return ExtractionResult::Unavailable;
        };

        let scratch = match self.stage(upload).await {
            Ok(scratch) => scratch,
            Err(e) => {
                error!(error = %e, "error staging upload");
                return ExtractionResult::Unavailable;
            }
        };
        info!(path = %scratch.display(), "file saved successfully");

        match kind {
            UploadKind::Text => match tokio::fs::read(&scratch).await.map(String::from_utf8) {
                Ok(Ok(text)) => ExtractionResult::Text {
                    provenance: Provenance::Upload,
                    text,
                },
                Ok(Err(e)) => {
                    warn!(error = %e, "text upload is not valid UTF-8");
                    ExtractionResult::Unavailable
                }
                Err(e) => {
                    error!(error = %e, "error reading text upload");
                    ExtractionResult::Unavailable
                }
            },
            UploadKind::Pdf => ExtractionResult::Text {
                provenance: Provenance::Pdf,
                text: pdf::extract_pdf_text(&scratch).await,
            },
            UploadKind::Image => match imaging::ocr_image(&scratch, self.ocr()).await {
                OcrOutcome::Text(text) => ExtractionResult::Text {
                    provenance: Provenance::Ocr,
                    text,
                },
                outcome => {
                    warn!(outcome = %outcome, "OCR processing issue, forwarding raw image");
                    ExtractionResult::ImagePath(scratch)
                }
            },
        }
    }

    /// Writes the upload to a uniquely named scratch file that keeps the
    /// original extension.
    async fn stage(&self, upload: &UploadedFile) -> Result<TempPath, ScratchError> {
        let suffix = upload
            .extension()
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let dir = self.upload_dir.clone();
        let bytes = upload.bytes.clone();

        let staged = tokio::task::spawn_blocking(move || -> std::io::Result<TempPath> {
            std::fs::create_dir_all(&dir)?;
            let mut file = tempfile::Builder::new()
                .prefix("upload-")
                .suffix(&suffix)
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file.into_temp_path())
        })
        .await??;

        Ok(staged)
    }
}
