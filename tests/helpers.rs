#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use serde_json::Value;
use std::{path::Path, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

use scriptgen::{
    app_state::AppState,
    config::Config,
    extractor::{OcrEngine, OcrError},
    generation::GroqClient,
    router::build_router,
};

/// OCR engine with a canned answer, or none at all.
pub struct StubOcr(pub Option<String>);

#[async_trait]
impl OcrEngine for StubOcr {
    async fn is_available(&self) -> bool {
        self.0.is_some()
    }

    async fn recognize(&self, _image: &Path) -> Result<String, OcrError> {
        Ok(self.0.clone().unwrap_or_default())
    }
}

/// A router over temporary directories. Keep the struct alive for as long as
/// the router is used.
pub struct TestApp {
    pub router: Router,
    pub root: TempDir,
}

impl TestApp {
    pub fn scripts_dir(&self) -> std::path::PathBuf {
        self.root.path().join("saved_scripts")
    }

    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.root.path().join("uploads")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn test_config(root: &Path, groq_url: &str) -> Config {
    Config::new("test-key")
        .with_groq_api_url(groq_url)
        .with_upload_dir(root.join("uploads"))
        .with_scripts_dir(root.join("saved_scripts"))
        .with_static_dir(root.join("static"))
}

pub async fn test_app(groq_url: &str) -> TestApp {
    test_app_with(groq_url, StubOcr(None), |config| config).await
}

pub async fn test_app_with(
    groq_url: &str,
    ocr: StubOcr,
    adjust: impl FnOnce(Config) -> Config,
) -> TestApp {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("static")).unwrap();
    std::fs::write(
        root.path().join("static/index.html"),
        "<html><body>generator</body></html>",
    )
    .unwrap();

    let config = adjust(test_config(root.path(), groq_url));
    let generator = Arc::new(GroqClient::from_config(&config).unwrap());
    let state = AppState::with_components(config, Arc::new(ocr), generator)
        .await
        .unwrap();

    TestApp {
        router: build_router(state),
        root,
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Chat-completions reply carrying `content` as the first choice.
pub fn completion(content: &str) -> Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

pub struct MultipartBuilder {
    boundary: &'static str,
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self {
            boundary: "scriptgen-test-boundary",
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}
