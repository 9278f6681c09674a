use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::header,
    response::{Html, IntoResponse, Response},
};
use chrono::Local;
use tokio_util::io::ReaderStream;
use tracing::{error, info};

use crate::{
    app_state::AppState,
    errors::{ApiError, ErrorResponse},
    scripts::{
        dtos::{
            SaveScriptRequest, SaveScriptResponse, ScriptContentResponse, ScriptListResponse,
            SuccessResponse,
        },
        markup::parse_script_markup,
        pages::saved_scripts_page,
    },
    store::StoreError,
};

#[utoipa::path(
    post,
    path = "/save_script",
    tag = "scripts",
    request_body = SaveScriptRequest,
    responses(
        (status = 200, description = "Script rendered and saved", body = SaveScriptResponse),
        (status = 400, description = "No formatted content", body = ErrorResponse),
        (status = 500, description = "Rendering or storage failed", body = ErrorResponse)
    )
)]
pub async fn save_script(
    State(state): State<AppState>,
    payload: Result<Json<SaveScriptRequest>, JsonRejection>,
) -> Result<Json<SaveScriptResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?;
    payload.validate().map_err(ApiError::BadRequest)?;

    let saved_at = Local::now().naive_local();
    let items = parse_script_markup(&payload.metadata.formatted_html);
    let document = state.renderer.render_document(items, saved_at).await?;

    let record = state
        .store
        .save(payload.into_new_script(), &document, saved_at)
        .await?;

    Ok(Json(SaveScriptResponse {
        success: true,
        filename: record.filename,
    }))
}

#[utoipa::path(
    get,
    path = "/api/saved_scripts",
    tag = "scripts",
    responses(
        (status = 200, description = "Saved scripts, newest first", body = ScriptListResponse),
        (status = 500, description = "Index unreadable", body = ErrorResponse)
    )
)]
pub async fn list_scripts(
    State(state): State<AppState>,
) -> Result<Json<ScriptListResponse>, ApiError> {
    let scripts = state.store.list().await?;
    Ok(Json(ScriptListResponse {
        success: true,
        scripts,
    }))
}

/// HTML listing. A broken index still renders the page, with the error.
#[utoipa::path(
    get,
    path = "/saved_scripts",
    tag = "scripts",
    responses((status = 200, description = "Saved scripts page", content_type = "text/html"))
)]
pub async fn saved_scripts(State(state): State<AppState>) -> Html<String> {
    match state.store.list().await {
        Ok(records) => Html(saved_scripts_page(&records, None)),
        Err(e) => {
            error!(error = %e, "error loading saved scripts");
            Html(saved_scripts_page(&[], Some(&e.to_string())))
        }
    }
}

#[utoipa::path(
    get,
    path = "/download_script/{filename}",
    tag = "scripts",
    params(("filename" = String, Path, description = "Saved document name")),
    responses(
        (status = 200, description = "The PDF document", content_type = "application/pdf"),
        (status = 400, description = "Invalid filename", body = ErrorResponse),
        (status = 404, description = "No such script", body = ErrorResponse)
    )
)]
pub async fn download_script(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.store.document_path(&filename).await?;
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StoreError::ScriptNotFound(filename.clone())
        } else {
            StoreError::Io(e)
        }
    })?;
    let length = file.metadata().await.map_err(StoreError::Io)?.len();

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/get_script_content/{filename}",
    tag = "scripts",
    params(("filename" = String, Path, description = "Saved document name")),
    responses(
        (status = 200, description = "Saved markup and title", body = ScriptContentResponse),
        (status = 400, description = "Invalid filename", body = ErrorResponse),
        (status = 404, description = "Script or metadata not found", body = ErrorResponse)
    )
)]
pub async fn get_script_content(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ScriptContentResponse>, ApiError> {
    let record = state.store.get(&filename).await?;
    Ok(Json(ScriptContentResponse {
        success: true,
        content: record.formatted_html,
        title: record.title,
    }))
}

#[utoipa::path(
    delete,
    path = "/delete_script/{filename}",
    tag = "scripts",
    params(("filename" = String, Path, description = "Saved document name")),
    responses(
        (status = 200, description = "Script deleted", body = SuccessResponse),
        (status = 400, description = "Invalid filename", body = ErrorResponse),
        (status = 404, description = "No script index", body = ErrorResponse)
    )
)]
pub async fn delete_script(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.store.delete(&filename).await?;
    info!(filename = %filename, "script removed via API");
    Ok(Json(SuccessResponse { success: true }))
}
