use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderName,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app_state::AppState,
    errors::{ErrorResponse, panic_response},
    generation::{
        dtos::{GenerateScriptForm, GenerateScriptResponse},
        handlers::generate_script,
    },
    health::{HealthResponse, health_check},
    scripts::{
        dtos::{
            SaveScriptMetadata, SaveScriptRequest, SaveScriptResponse, ScriptContentResponse,
            ScriptListResponse, SuccessResponse,
        },
        handlers::{
            delete_script, download_script, get_script_content, list_scripts, save_script,
            saved_scripts,
        },
    },
    store::{ScriptRecord, ScriptSection},
};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::generation::handlers::generate_script,
        crate::scripts::handlers::save_script,
        crate::scripts::handlers::list_scripts,
        crate::scripts::handlers::saved_scripts,
        crate::scripts::handlers::download_script,
        crate::scripts::handlers::get_script_content,
        crate::scripts::handlers::delete_script,
        crate::health::health_check,
    ),
    components(schemas(
        GenerateScriptForm,
        GenerateScriptResponse,
        SaveScriptRequest,
        SaveScriptMetadata,
        SaveScriptResponse,
        ScriptListResponse,
        ScriptContentResponse,
        SuccessResponse,
        ScriptRecord,
        ScriptSection,
        ErrorResponse,
        HealthResponse,
    )),
    tags(
        (name = "scripts", description = "Video script generation and saved scripts"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir().to_path_buf();
    let body_limit = state.config.max_upload_bytes();
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/generate_script", post(generate_script))
        .route("/save_script", post(save_script))
        .route("/saved_scripts", get(saved_scripts))
        .route("/api/saved_scripts", get(list_scripts))
        .route("/download_script/{filename}", get(download_script))
        .route("/get_script_content/{filename}", get(get_script_content))
        .route("/delete_script/{filename}", delete(delete_script))
        .route("/healthz", get(health_check))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(&static_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CatchPanicLayer::custom(panic_response)),
        )
}
