use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Optical character recognition backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Whether the engine can be used at all (binary installed, models present).
    async fn is_available(&self) -> bool;

    /// Recognises the text in the image at `image`.
    async fn recognize(&self, image: &Path) -> Result<String, OcrError>;
}

/// Runs the `tesseract` executable as a child process.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn is_available(&self) -> bool {
        match Command::new(&self.command).arg("--version").output().await {
            Ok(output) if output.status.success() => {
                // tesseract has printed its version to either stream depending on release
                let banner = if output.stdout.is_empty() {
                    &output.stderr
                } else {
                    &output.stdout
                };
                let version = String::from_utf8_lossy(banner);
                debug!(
                    version = version.lines().next().unwrap_or_default(),
                    "tesseract available"
                );
                true
            }
            Ok(output) => {
                error!(status = %output.status, "tesseract not properly installed");
                false
            }
            Err(e) => {
                error!(command = %self.command, error = %e, "tesseract not properly installed");
                false
            }
        }
    }

    async fn recognize(&self, image: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.command)
            .arg(image)
            .arg("stdout")
            .output()
            .await
            .map_err(|source| OcrError::Launch {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_reported_unavailable() {
        let engine = TesseractOcr::new("definitely-not-a-real-ocr-binary");
        assert!(!engine.is_available().await);
    }

    #[tokio::test]
    async fn missing_binary_fails_to_launch() {
        let engine = TesseractOcr::new("definitely-not-a-real-ocr-binary");
        let err = engine
            .recognize(Path::new("/tmp/whatever.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Launch { .. }));
    }
}
