use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use bytes::Bytes;
use tracing::{info, instrument, warn};

use crate::{
    app_state::AppState,
    errors::{ApiError, ErrorResponse},
    extractor::{ExtractionResult, UploadedFile},
    generation::{
        GenerationRequest, ImageAttachment,
        dtos::{GenerateScriptForm, GenerateScriptResponse},
    },
    prompt::assemble,
};

#[derive(Debug, Default)]
struct GenerateForm {
    prompt: String,
    url: String,
    file: Option<UploadedFile>,
}

async fn read_form(mut multipart: Multipart) -> Result<GenerateForm, ApiError> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "prompt" | "url" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?;
                if name == "prompt" {
                    form.prompt = value;
                } else {
                    form.url = value;
                }
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?;
                // browsers send an empty part when no file was chosen
                if !filename.is_empty() {
                    form.file = Some(UploadedFile::new(filename, bytes));
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

#[utoipa::path(
    post,
    path = "/generate_script",
    tag = "scripts",
    request_body(content = GenerateScriptForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Script generated", body = GenerateScriptResponse),
        (status = 400, description = "Missing prompt", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn generate_script(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerateScriptResponse>, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?;
    let form = read_form(multipart).await?;

    let prompt = form.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::BadRequest("No prompt provided".to_string()));
    }
    let url = form.url.trim();

    let extraction = async {
        match &form.file {
            Some(upload) => state.extractor.extract(upload).await,
            None => ExtractionResult::Unavailable,
        }
    };
    let reference = async {
        if url.is_empty() {
            None
        } else {
            Some(state.fetcher.reference_context(url).await)
        }
    };
    let (extraction, reference) = tokio::join!(extraction, reference);

    let file_text = extraction.labelled_text();
    let assembled = assemble(prompt, file_text.as_deref(), reference.as_deref());

    let image = match extraction.image_path() {
        Some(path) => match ImageAttachment::from_path(path).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(error = %e, "could not attach image, continuing with text only");
                None
            }
        },
        None => None,
    };

    info!(
        prompt_chars = assembled.prompt.chars().count(),
        context_chars = assembled.additional_context.chars().count(),
        with_image = image.is_some(),
        "prompt assembled"
    );

    let script = state
        .generator
        .generate(GenerationRequest {
            prompt: assembled,
            image,
        })
        .await?;

    // scratch upload, if any, is removed here
    drop(extraction);

    Ok(Json(GenerateScriptResponse {
        success: true,
        script,
    }))
}
