use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::extractor::{ContentExtractor, OcrEngine, TesseractOcr};
use crate::fetcher::{FetchError, Fetcher};
use crate::generation::{GenerationError, GroqClient, ScriptGenerator};
use crate::render::DocumentRenderer;
use crate::store::{ScriptStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build URL fetcher: {0}")]
    Fetcher(#[from] FetchError),

    #[error("failed to build model client: {0}")]
    Generator(#[from] GenerationError),

    #[error("failed to open script store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<ContentExtractor>,
    pub fetcher: Fetcher,
    pub generator: Arc<dyn ScriptGenerator + Send + Sync>,
    pub renderer: DocumentRenderer,
    pub store: Arc<ScriptStore>,
}

impl AppState {
    /// Wires the production components: tesseract OCR and the Groq client.
    pub async fn from_config(config: Config) -> Result<Self, StartupError> {
        let ocr: Arc<dyn OcrEngine> = Arc::new(TesseractOcr::new(config.tesseract_cmd()));
        let generator = Arc::new(GroqClient::from_config(&config)?);
        Self::with_components(config, ocr, generator).await
    }

    /// Same as [`AppState::from_config`] with caller-supplied OCR engine and
    /// generator.
    pub async fn with_components(
        config: Config,
        ocr: Arc<dyn OcrEngine>,
        generator: Arc<dyn ScriptGenerator + Send + Sync>,
    ) -> Result<Self, StartupError> {
        let fetcher = Fetcher::new(config.url_fetch_timeout())?;
        let extractor = Arc::new(ContentExtractor::new(config.upload_dir(), ocr));
        let store = Arc::new(ScriptStore::open(config.scripts_dir()).await?);

        Ok(Self {
            config: Arc::new(config),
            extractor,
            fetcher,
            generator,
            renderer: DocumentRenderer::default(),
            store,
        })
    }
}
