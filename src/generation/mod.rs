pub mod dtos;
mod groq;
pub mod handlers;

pub use groq::GroqClient;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use thiserror::Error;

use crate::prompt::AssembledPrompt;

pub const SYSTEM_PROMPT: &str =
    "You are a professional video script writer. Create engaging and well-structured video scripts.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to the model failed: {0}")]
    Transport(String),

    #[error("request to the model timed out")]
    Timeout,

    #[error("model API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("malformed model response: {0}")]
    Malformed(String),

    #[error("failed to read image attachment: {0}")]
    Attachment(#[from] std::io::Error),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else if err.is_decode() {
            GenerationError::Malformed(err.to_string())
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

/// An image forwarded to a vision-capable model as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub data_url: String,
}

impl ImageAttachment {
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            data_url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, GenerationError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(mime_for(path), &bytes))
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: AssembledPrompt,
    pub image: Option<ImageAttachment>,
}

/// Produces a video script from an assembled prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}
