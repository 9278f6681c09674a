use crate::fetcher::{
    errors::FetchError, pipeline::process_response, text::visible_text, types::PageResponse,
};
use crate::text::truncate_with_ellipsis;
use reqwest::{Client, ClientBuilder, header};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Bytes of a response body kept; anything beyond is discarded unread.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Maximum characters of page text folded into a reference context.
pub const MAX_REFERENCE_CHARS: usize = 4000;

/// Media types that never carry readable text.
const BINARY_CONTENT_TYPES: [&str; 4] = ["image/", "audio/", "video/", "application/pdf"];

/// Retrieves reference pages for the prompt. Cheap to clone; the underlying
/// connection pool is shared.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static(
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    ),
                );
                headers
            })
            .build()
            .map_err(|e| FetchError::Unknown(e.to_string()))?;

        Ok(Self { client })
    }

    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        let parsed_url = url::Url::parse(url)?;
        if !matches!(parsed_url.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme(parsed_url.scheme().to_string()));
        }

        let mut response = self
            .client
            .get(parsed_url)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let final_url = response.url().clone();
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        let lowered = content_type.to_ascii_lowercase();
        if BINARY_CONTENT_TYPES.iter().any(|binary| lowered.starts_with(binary)) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let mut body = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(FetchError::from_reqwest_error)?
        {
            let room = MAX_BODY_BYTES - body.len();
            if chunk.len() > room {
                body.extend_from_slice(&chunk[..room]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }

        if truncated {
            warn!(kept = body.len(), "response body exceeds cap, keeping its head");
        }

        Ok(process_response(
            final_url,
            status,
            &body,
            &content_type,
            truncated,
        ))
    }

    /// Builds the prompt context for a reference URL. Never fails: any fetch
    /// problem degrades to a context naming only the URL.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn reference_context(&self, url: &str) -> String {
        match self.fetch(url).await {
            Ok(page) => {
                let text = truncate_with_ellipsis(&visible_text(&page.body_utf8), MAX_REFERENCE_CHARS);
                info!(
                    status = %page.status,
                    charset = ?page.charset,
                    chars = text.chars().count(),
                    "fetched reference page"
                );
                format!("Reference URL ({url}):\n{text}")
            }
            Err(e) => {
                warn!(error = %e, "error fetching URL content");
                format!("Reference URL: {url}")
            }
        }
    }
}
