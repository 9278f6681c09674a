use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub scripts_dir: String,
    /// OCR is optional: when unavailable, images are forwarded to the model
    /// instead of being transcribed.
    pub ocr: String,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Health check successful", body = HealthResponse),
        (status = 503, description = "Script storage unavailable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage_ok = state.store.is_available().await;
    let ocr_ok = state.extractor.ocr().is_available().await;

    let response = HealthResponse {
        status: if storage_ok { "OK" } else { "DEGRADED" }.to_string(),
        scripts_dir: if storage_ok { "healthy" } else { "unavailable" }.to_string(),
        ocr: if ocr_ok { "available" } else { "unavailable" }.to_string(),
    };

    if storage_ok {
        info!(ocr = %response.ocr, "Health check passed");
        (StatusCode::OK, Json(response))
    } else {
        error!("Script storage health check failed");
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
