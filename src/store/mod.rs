mod record;

pub use record::{NewScript, ScriptRecord, ScriptSection};

use chrono::NaiveDateTime;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::scripts::title::extract_title;
use crate::text::truncate_with_ellipsis;

pub const INDEX_FILE: &str = "scripts_metadata.json";
const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid filename")]
    InvalidFilename(String),

    #[error("Script not found")]
    ScriptNotFound(String),

    #[error("Metadata not found")]
    MetadataNotFound(String),

    #[error("Script index not found")]
    IndexNotFound,

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("script index is corrupt: {0}")]
    CorruptIndex(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ScriptNotFound(_) | StoreError::MetadataNotFound(_) | StoreError::IndexNotFound
        )
    }
}

/// Rejects anything that is not a single plain path component.
pub fn validate_filename(filename: &str) -> Result<(), StoreError> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename.contains("..")
        || filename.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StoreError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

/// Rendered script documents plus a JSON index, both kept in one directory.
/// Index updates are serialised and written with a rename so readers never
/// observe a half-written file.
pub struct ScriptStore {
    dir: PathBuf,
    index_lock: Mutex<()>,
}

impl ScriptStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            index_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Whether the storage directory exists and is a directory.
    pub async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// Writes the document under a fresh timestamped name and records it at
    /// the head of the index.
    #[instrument(skip_all, fields(bytes = document.len()))]
    pub async fn save(
        &self,
        script: NewScript,
        document: &[u8],
        saved_at: NaiveDateTime,
    ) -> Result<ScriptRecord, StoreError> {
        let _guard = self.index_lock.lock().await;

        let mut index = self.read_index().await?.unwrap_or_default();
        let filename = self.allocate_filename(&index, saved_at).await?;

        let document_path = self.dir.join(&filename);
        tokio::fs::write(&document_path, document).await?;

        let record = ScriptRecord {
            filename: filename.clone(),
            title: extract_title(script.title_source()),
            timestamp: saved_at,
            preview: truncate_with_ellipsis(&script.script, PREVIEW_CHARS),
            sections: script.sections,
            formatted_html: script.formatted_html,
        };
        index.insert(0, record.clone());
        if let Err(e) = self.write_index(&index).await {
            // unindexed documents are invisible to every endpoint
            if let Err(cleanup) = tokio::fs::remove_file(&document_path).await {
                warn!(error = %cleanup, filename = %filename, "failed to remove unindexed document");
            }
            return Err(e);
        }

        info!(filename = %filename, title = %record.title, "script saved");
        Ok(record)
    }

    /// All records, newest first. A missing index is an empty listing.
    pub async fn list(&self) -> Result<Vec<ScriptRecord>, StoreError> {
        let mut records = self.read_index().await?.unwrap_or_default();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    pub async fn get(&self, filename: &str) -> Result<ScriptRecord, StoreError> {
        self.document_path(filename).await?;
        let index = self.read_index().await?.ok_or(StoreError::IndexNotFound)?;
        index
            .into_iter()
            .find(|record| record.filename == filename)
            .ok_or_else(|| StoreError::MetadataNotFound(filename.to_string()))
    }

    /// Path of an existing rendered document.
    pub async fn document_path(&self, filename: &str) -> Result<PathBuf, StoreError> {
        validate_filename(filename)?;
        let path = self.dir.join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StoreError::ScriptNotFound(filename.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::ScriptNotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the document (if present) and its index entry.
    #[instrument(skip(self))]
    pub async fn delete(&self, filename: &str) -> Result<(), StoreError> {
        validate_filename(filename)?;
        let _guard = self.index_lock.lock().await;

        match tokio::fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("document already absent");
            }
            Err(e) => return Err(e.into()),
        }

        let mut index = self.read_index().await?.ok_or(StoreError::IndexNotFound)?;
        index.retain(|record| record.filename != filename);
        self.write_index(&index).await?;

        info!("script deleted");
        Ok(())
    }

    async fn allocate_filename(
        &self,
        index: &[ScriptRecord],
        saved_at: NaiveDateTime,
    ) -> Result<String, StoreError> {
        let stem = saved_at.format("%Y%m%d_%H%M%S").to_string();
        let mut attempt = 0u32;
        loop {
            let candidate = if attempt == 0 {
                format!("{stem}_script.pdf")
            } else {
                format!("{stem}_script_{attempt}.pdf")
            };
            let indexed = index.iter().any(|record| record.filename == candidate);
            if !indexed && !tokio::fs::try_exists(self.dir.join(&candidate)).await? {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }

    async fn read_index(&self) -> Result<Option<Vec<ScriptRecord>>, StoreError> {
        match tokio::fs::read(self.index_path()).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_index(&self, index: &[ScriptRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(index)?;
        let staging = self.dir.join(format!("{INDEX_FILE}.tmp"));
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, self.index_path()).await?;
        Ok(())
    }
}
