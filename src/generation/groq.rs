use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, instrument};

use super::{GenerationError, GenerationRequest, SYSTEM_PROMPT, ScriptGenerator};
use crate::config::Config;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(String),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl<'a> },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
    detail: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for Groq's OpenAI-compatible chat completions endpoint.
pub struct GroqClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    vision_model: String,
    temperature: f32,
}

impl GroqClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let model = model.into();
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            vision_model: model.clone(),
            model,
            temperature: 0.7,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let client = Self::new(
            config.groq_api_url(),
            config.groq_api_key(),
            config.model(),
            config.generation_timeout(),
        )?;
        Ok(client
            .with_vision_model(config.vision_model())
            .with_temperature(config.temperature()))
    }

    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_request<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        let text = request.prompt.user_text();
        let (model, content) = match &request.image {
            Some(image) => (
                self.vision_model.as_str(),
                MessageContent::Parts(vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: &image.data_url,
                            detail: "high",
                        },
                    },
                    ContentPart::Text { text },
                ]),
            ),
            None => (self.model.as_str(), MessageContent::Text(text)),
        };

        ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl ScriptGenerator for GroqClient {
    #[instrument(skip_all, fields(with_image = request.image.is_some()))]
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let body = self.build_request(&request);
        info!(model = body.model, "requesting script");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|envelope| envelope.error.message)
                .unwrap_or(raw);
            error!(status = status.as_u16(), message = %message, "model API error");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let script = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if script.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        info!(chars = script.chars().count(), "script generated");
        Ok(script)
    }
}
