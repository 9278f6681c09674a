use image::{ColorType, ImageFormat, ImageReader, RgbImage};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::extractor::ocr::OcrEngine;

/// Smallest width or height OCR is attempted on.
pub const MIN_DIMENSION: u32 = 50;
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Why an image was not handed to the OCR engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRejection {
    #[error("Image too small for OCR")]
    TooSmall { width: u32, height: u32 },

    #[error("Unsupported image format")]
    UnsupportedColor(String),

    #[error("File size too large")]
    TooLarge(u64),

    #[error("{0}")]
    Unreadable(String),
}

/// Result of running an image through OCR. Only `Text` carries usable
/// content; every other variant has a descriptive message instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrOutcome {
    Text(String),
    NoText,
    EngineUnavailable,
    Rejected(ImageRejection),
    Failed(String),
}

impl Display for OcrOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrOutcome::Text(text) => f.write_str(text),
            OcrOutcome::NoText => f.write_str("No text detected in image"),
            OcrOutcome::EngineUnavailable => f.write_str("OCR not available"),
            OcrOutcome::Rejected(reason) => write!(f, "Image validation failed: {reason}"),
            OcrOutcome::Failed(reason) => write!(f, "OCR Error: {reason}"),
        }
    }
}

/// Checks that the image at `path` is suitable for OCR and returns it
/// normalised to 8-bit RGB.
pub fn validate_image(path: &Path) -> Result<RgbImage, ImageRejection> {
    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| ImageRejection::Unreadable(e.to_string()))?
        .decode()
        .map_err(|e| ImageRejection::Unreadable(e.to_string()))?;

    let (width, height) = (image.width(), image.height());
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        warn!(width, height, "image too small");
        return Err(ImageRejection::TooSmall { width, height });
    }

    let color = image.color();
    if !matches!(color, ColorType::L8 | ColorType::Rgb8) {
        warn!(?color, "unsupported image mode");
        return Err(ImageRejection::UnsupportedColor(format!("{color:?}")));
    }

    let size = std::fs::metadata(path)
        .map_err(|e| ImageRejection::Unreadable(e.to_string()))?
        .len();
    if size > MAX_IMAGE_BYTES {
        warn!(size, "image file too large");
        return Err(ImageRejection::TooLarge(size));
    }

    Ok(image.to_rgb8())
}

/// Validates and writes the normalised image to a single-use PNG. The file
/// is removed when the returned handle drops.
fn prepare_for_ocr(path: &Path) -> Result<NamedTempFile, OcrOutcome> {
    let rgb = validate_image(path).map_err(OcrOutcome::Rejected)?;

    let prepared = tempfile::Builder::new()
        .prefix("ocr-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| OcrOutcome::Failed(e.to_string()))?;
    rgb.save_with_format(prepared.path(), ImageFormat::Png)
        .map_err(|e| OcrOutcome::Failed(e.to_string()))?;

    debug!(path = %prepared.path().display(), "saved preprocessed image");
    Ok(prepared)
}

/// Runs OCR on an uploaded image. Never fails: problems are reported through
/// the non-`Text` outcomes.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn ocr_image(path: &Path, engine: &dyn OcrEngine) -> OcrOutcome {
    if !engine.is_available().await {
        return OcrOutcome::EngineUnavailable;
    }

    let owned: PathBuf = path.to_path_buf();
    let prepared = match tokio::task::spawn_blocking(move || prepare_for_ocr(&owned)).await {
        Ok(Ok(prepared)) => prepared,
        Ok(Err(outcome)) => return outcome,
        Err(join_error) => return OcrOutcome::Failed(join_error.to_string()),
    };

    info!("starting OCR processing");
    let recognized = engine.recognize(prepared.path()).await;
    drop(prepared);

    match recognized {
        Ok(text) if text.trim().is_empty() => {
            warn!("OCR produced no text");
            OcrOutcome::NoText
        }
        Ok(text) => {
            let text = text.trim().to_string();
            info!(chars = text.chars().count(), "OCR successful");
            OcrOutcome::Text(text)
        }
        Err(e) => {
            warn!(error = %e, "OCR processing error");
            OcrOutcome::Failed(e.to_string())
        }
    }
}
