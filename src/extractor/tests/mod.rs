use bytes::Bytes;
use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::extractor::ocr::MockOcrEngine;
use crate::extractor::{
    ContentExtractor, ExtractionResult, ImageRejection, OcrError, OcrOutcome, Provenance,
    UploadedFile, imaging,
};
use crate::render::{ContentItem, DocumentRenderer, Span};

fn png_bytes(image: DynamicImage) -> Bytes {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode test image");
    Bytes::from(out.into_inner())
}

fn rgb_png(width: u32, height: u32) -> Bytes {
    png_bytes(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb([255, 255, 255]),
    )))
}

fn extractor_with(dir: &tempfile::TempDir, ocr: MockOcrEngine) -> ContentExtractor {
    ContentExtractor::new(dir.path(), Arc::new(ocr))
}

/// Shared slot the OCR mock records its input path in.
fn recorded_path() -> Arc<Mutex<Option<PathBuf>>> {
    Arc::new(Mutex::new(None))
}

fn take_recorded(slot: &Arc<Mutex<Option<PathBuf>>>) -> PathBuf {
    slot.lock()
        .unwrap()
        .take()
        .expect("OCR engine should have been invoked")
}

fn upload_dir_is_empty(dir: &tempfile::TempDir) -> bool {
    std::fs::read_dir(dir.path())
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true)
}

#[tokio::test]
async fn text_upload_round_trips_and_is_cleaned_up() {
    let dir = tempfile::tempdir().unwrap();
    let mut ocr = MockOcrEngine::new();
    ocr.expect_is_available().never();
    let extractor = extractor_with(&dir, ocr);

    let content = "Line one\nLínea dos ✓\n\ttabbed";
    let result = extractor
        .extract(&UploadedFile::new("notes.TXT", content.as_bytes().to_vec()))
        .await;

    match &result {
        ExtractionResult::Text { provenance, text } => {
            assert_eq!(*provenance, Provenance::Upload);
            assert_eq!(text, content);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(upload_dir_is_empty(&dir));
}

#[tokio::test]
async fn invalid_utf8_text_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = extractor_with(&dir, MockOcrEngine::new());

    let result = extractor
        .extract(&UploadedFile::new("notes.txt", vec![0xff, 0xfe, 0x00]))
        .await;
    assert!(matches!(result, ExtractionResult::Unavailable));
}

#[tokio::test]
async fn disallowed_extension_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = extractor_with(&dir, MockOcrEngine::new());

    let result = extractor
        .extract(&UploadedFile::new("payload.exe", b"MZ".to_vec()))
        .await;
    assert!(matches!(result, ExtractionResult::Unavailable));
    assert!(upload_dir_is_empty(&dir));
}

#[tokio::test]
async fn small_image_is_rejected_without_running_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let mut ocr = MockOcrEngine::new();
    ocr.expect_is_available().returning(|| true);
    ocr.expect_recognize().never();

    let staged = dir.path().join("tiny.png");
    std::fs::write(&staged, rgb_png(40, 200)).unwrap();
    let outcome = imaging::ocr_image(&staged, &ocr).await;
    assert_eq!(
        outcome,
        OcrOutcome::Rejected(ImageRejection::TooSmall {
            width: 40,
            height: 200
        })
    );
    assert_eq!(
        outcome.to_string(),
        "Image validation failed: Image too small for OCR"
    );

    let extractor = extractor_with(&dir, ocr);
    let result = extractor
        .extract(&UploadedFile::new("tiny.png", rgb_png(10, 10)))
        .await;
    assert!(result.image_path().is_some());
}

#[tokio::test]
async fn images_with_alpha_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("alpha.png");
    std::fs::write(
        &staged,
        png_bytes(DynamicImage::ImageRgba8(RgbaImage::new(80, 80))),
    )
    .unwrap();

    let err = imaging::validate_image(&staged).unwrap_err();
    assert!(matches!(err, ImageRejection::UnsupportedColor(_)));
}

#[tokio::test]
async fn recognised_text_is_labelled_as_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let seen = recorded_path();
    let slot = seen.clone();
    let mut ocr = MockOcrEngine::new();
    ocr.expect_is_available().returning(|| true);
    ocr.expect_recognize()
        .times(1)
        .returning(move |path| {
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
            assert!(path.exists());
            *slot.lock().unwrap() = Some(path.to_path_buf());
            Ok("  Quarterly revenue up 12%\n".to_string())
        });
    let extractor = extractor_with(&dir, ocr);

    let result = extractor
        .extract(&UploadedFile::new("chart.png", rgb_png(120, 80)))
        .await;

    assert_eq!(
        result.labelled_text().as_deref(),
        Some("OCR Extract:\nQuarterly revenue up 12%")
    );
    assert!(upload_dir_is_empty(&dir));
    assert!(!take_recorded(&seen).exists(), "OCR input must be removed");
}

#[tokio::test]
async fn empty_ocr_output_forwards_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let mut ocr = MockOcrEngine::new();
    ocr.expect_is_available().returning(|| true);
    ocr.expect_recognize().returning(|_| Ok("   \n".to_string()));
    let extractor = extractor_with(&dir, ocr);

    let result = extractor
        .extract(&UploadedFile::new("photo.jpg", rgb_png(64, 64)))
        .await;

    let path = result
        .image_path()
        .expect("image should be forwarded")
        .to_path_buf();
    assert!(path.exists());
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));

    drop(result);
    assert!(!path.exists());
}

#[tokio::test]
async fn ocr_failures_and_missing_engine_forward_the_image() {
    let dir = tempfile::tempdir().unwrap();

    let seen = recorded_path();
    let slot = seen.clone();
    let mut failing = MockOcrEngine::new();
    failing.expect_is_available().returning(|| true);
    failing.expect_recognize().returning(move |path| {
        *slot.lock().unwrap() = Some(path.to_path_buf());
        Err(OcrError::Launch {
            command: "tesseract".to_string(),
            source: std::io::Error::other("boom"),
        })
    });
    let result = extractor_with(&dir, failing)
        .extract(&UploadedFile::new("scan.jpeg", rgb_png(64, 64)))
        .await;
    assert!(result.image_path().is_some());
    assert!(
        !take_recorded(&seen).exists(),
        "OCR input must be removed after a failure"
    );

    let mut missing = MockOcrEngine::new();
    missing.expect_is_available().returning(|| false);
    missing.expect_recognize().never();
    let result = extractor_with(&dir, missing)
        .extract(&UploadedFile::new("scan.png", rgb_png(64, 64)))
        .await;
    assert!(result.image_path().is_some());
}

#[tokio::test]
async fn pdf_text_is_extracted_and_labelled() {
    let dir = tempfile::tempdir().unwrap();
    let generated_at = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .unwrap();
    let pdf = DocumentRenderer::default()
        .render(
            &[ContentItem::Paragraph(vec![Span::plain("Photosynthesis explained")])],
            generated_at,
        )
        .unwrap();

    let extractor = extractor_with(&dir, MockOcrEngine::new());
    let result = extractor
        .extract(&UploadedFile::new("lesson.pdf", pdf))
        .await;

    let text = result.labelled_text().expect("pdf should yield text");
    assert!(text.starts_with("PDF Extract:\n"));
    assert!(text.contains("Photosynthesis"));
    assert!(upload_dir_is_empty(&dir));
}

#[tokio::test]
async fn corrupt_pdf_yields_empty_text() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = extractor_with(&dir, MockOcrEngine::new());

    let result = extractor
        .extract(&UploadedFile::new("broken.pdf", b"%PDF-1.4 not really".to_vec()))
        .await;

    match &result {
        ExtractionResult::Text { provenance, text } => {
            assert_eq!(*provenance, Provenance::Pdf);
            assert!(text.is_empty());
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(result.labelled_text(), None);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn arbitrary_uploads_never_panic(
            name in "[a-z]{1,8}\\.(txt|pdf|png|jpg|jpeg|exe)",
            bytes in proptest::collection::vec(any::<u8>(), 0..2048),
        ) {
            let dir = tempfile::tempdir().unwrap();
            let mut ocr = MockOcrEngine::new();
            ocr.expect_is_available().returning(|| true);
            ocr.expect_recognize().returning(|_| Ok(String::new()));
            let extractor = extractor_with(&dir, ocr);

            let rt = tokio::runtime::Runtime::new().unwrap();
            let result = rt.block_on(extractor.extract(&UploadedFile::new(name, bytes)));
            drop(result);
            prop_assert!(upload_dir_is_empty(&dir));
        }
    }
}
