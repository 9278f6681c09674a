//! Configuration handling for the application.
//!
//! Everything is read from environment variables (optionally seeded from a
//! `.env` file by the binary) with development defaults, except the Groq API
//! key which has no sensible default: without it the generation endpoint can
//! never succeed, so `Config::from_env` refuses to start.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names. Public so tests and deployment tooling can
/// refer to them.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_GROQ_API_URL: &str = "GROQ_API_URL";
pub const ENV_MODEL_NAME: &str = "MODEL_NAME";
pub const ENV_VISION_MODEL_NAME: &str = "VISION_MODEL_NAME";
pub const ENV_GENERATION_TEMPERATURE: &str = "GENERATION_TEMPERATURE";
pub const ENV_GENERATION_TIMEOUT_SECS: &str = "GENERATION_TIMEOUT_SECS";
pub const ENV_URL_FETCH_TIMEOUT_SECS: &str = "URL_FETCH_TIMEOUT_SECS";
pub const ENV_UPLOAD_DIR: &str = "UPLOAD_DIR";
pub const ENV_SCRIPTS_DIR: &str = "SCRIPTS_DIR";
pub const ENV_STATIC_DIR: &str = "STATIC_DIR";
pub const ENV_TESSERACT_CMD: &str = "TESSERACT_CMD";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";

/// Default development values used when environment variables are absent.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL_NAME: &str = "llama-3.3-70b-versatile";
const DEFAULT_GENERATION_TEMPERATURE: f32 = 0.7;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_URL_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_SCRIPTS_DIR: &str = "saved_scripts";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_TESSERACT_CMD: &str = "tesseract";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    bind_addr: String,
    groq_api_key: String,
    groq_api_url: String,
    model: String,
    vision_model: String,
    temperature: f32,
    generation_timeout: Duration,
    url_fetch_timeout: Duration,
    upload_dir: PathBuf,
    scripts_dir: PathBuf,
    static_dir: PathBuf,
    tesseract_cmd: String,
    max_upload_bytes: usize,
}

impl Config {
    /// Create a config with the given API key and development defaults for
    /// everything else. Use the `with_*` methods to adjust individual values.
    pub fn new(groq_api_key: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            groq_api_key: groq_api_key.into(),
            groq_api_url: DEFAULT_GROQ_API_URL.to_string(),
            model: DEFAULT_MODEL_NAME.to_string(),
            vision_model: DEFAULT_MODEL_NAME.to_string(),
            temperature: DEFAULT_GENERATION_TEMPERATURE,
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            url_fetch_timeout: Duration::from_secs(DEFAULT_URL_FETCH_TIMEOUT_SECS),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            scripts_dir: PathBuf::from(DEFAULT_SCRIPTS_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            tesseract_cmd: DEFAULT_TESSERACT_CMD.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Load from environment variables, falling back to development defaults.
    ///
    /// Fails when the API key is missing or blank, or when a numeric variable
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let groq_api_key = env::var(ENV_GROQ_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing {
                var: ENV_GROQ_API_KEY,
            })?;

        let model = env::var(ENV_MODEL_NAME).unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string());
        let vision_model = env::var(ENV_VISION_MODEL_NAME).unwrap_or_else(|_| model.clone());

        Ok(Self {
            bind_addr: env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            groq_api_key,
            groq_api_url: env::var(ENV_GROQ_API_URL)
                .unwrap_or_else(|_| DEFAULT_GROQ_API_URL.to_string()),
            model,
            vision_model,
            temperature: parse_var(ENV_GENERATION_TEMPERATURE, DEFAULT_GENERATION_TEMPERATURE)?,
            generation_timeout: Duration::from_secs(parse_var(
                ENV_GENERATION_TIMEOUT_SECS,
                DEFAULT_GENERATION_TIMEOUT_SECS,
            )?),
            url_fetch_timeout: Duration::from_secs(parse_var(
                ENV_URL_FETCH_TIMEOUT_SECS,
                DEFAULT_URL_FETCH_TIMEOUT_SECS,
            )?),
            upload_dir: env::var(ENV_UPLOAD_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            scripts_dir: env::var(ENV_SCRIPTS_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCRIPTS_DIR)),
            static_dir: env::var(ENV_STATIC_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR)),
            tesseract_cmd: env::var(ENV_TESSERACT_CMD)
                .unwrap_or_else(|_| DEFAULT_TESSERACT_CMD.to_string()),
            max_upload_bytes: parse_var(ENV_MAX_UPLOAD_BYTES, DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }

    pub fn with_groq_api_url(mut self, url: impl Into<String>) -> Self {
        self.groq_api_url = url.into();
        self
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    pub fn with_scripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = dir.into();
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Bearer token for the Groq API.
    pub fn groq_api_key(&self) -> &str {
        &self.groq_api_key
    }
    /// Chat-completions endpoint.
    pub fn groq_api_url(&self) -> &str {
        &self.groq_api_url
    }
    pub fn model(&self) -> &str {
        &self.model
    }
    /// Model used when an image is attached to the request.
    pub fn vision_model(&self) -> &str {
        &self.vision_model
    }
    pub fn temperature(&self) -> f32 {
        self.temperature
    }
    pub fn generation_timeout(&self) -> Duration {
        self.generation_timeout
    }
    pub fn url_fetch_timeout(&self) -> Duration {
        self.url_fetch_timeout
    }
    /// Scratch directory for uploaded files.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
    /// Directory holding rendered PDFs and the metadata index.
    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }
    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }
    pub fn tesseract_cmd(&self) -> &str {
        &self.tesseract_cmd
    }
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is absent or blank.
    Missing { var: &'static str },
    /// A variable is present but does not parse.
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing { var } => {
                write!(f, "missing required environment variable '{}'", var)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
