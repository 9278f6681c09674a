use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart form accepted by `POST /generate_script`. Documentation only;
/// the handler reads the fields from the stream.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct GenerateScriptForm {
    /// What the video should be about. Required.
    pub prompt: String,
    /// Optional `.txt`, `.pdf`, `.png`, `.jpg` or `.jpeg` upload.
    #[schema(value_type = Option<String>, format = Binary)]
    pub file: Option<Vec<u8>>,
    /// Optional reference page.
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateScriptResponse {
    pub success: bool,
    pub script: String,
}
