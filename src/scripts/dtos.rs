use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::{NewScript, ScriptRecord, ScriptSection};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SaveScriptMetadata {
    /// Formatted script markup as displayed by the web client.
    #[serde(default)]
    pub formatted_html: String,
    #[serde(default)]
    pub unformatted_sections: Vec<ScriptSection>,
    /// Client-side timestamp. Informational; the server stamps its own.
    pub timestamp: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveScriptRequest {
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub metadata: SaveScriptMetadata,
}

impl SaveScriptRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.metadata.formatted_html.trim().is_empty() {
            return Err("No formatted content provided".to_string());
        }
        Ok(())
    }

    pub fn into_new_script(self) -> NewScript {
        NewScript {
            script: self.script,
            title: self.title,
            sections: self.metadata.unformatted_sections,
            formatted_html: self.metadata.formatted_html,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveScriptResponse {
    pub success: bool,
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScriptListResponse {
    pub success: bool,
    pub scripts: Vec<ScriptRecord>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScriptContentResponse {
    pub success: bool,
    /// The saved formatted markup.
    pub content: String,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}
