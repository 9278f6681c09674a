use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A titled block of the plain-text script, as split up by the web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScriptSection {
    pub title: String,
    #[serde(default)]
    pub content: Vec<String>,
}

/// One entry of the script index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScriptRecord {
    pub filename: String,
    pub title: String,
    /// Local time the script was saved.
    #[schema(value_type = String, example = "2024-03-09T14:05:30.123456")]
    pub timestamp: NaiveDateTime,
    pub preview: String,
    #[serde(default)]
    pub sections: Vec<ScriptSection>,
    #[serde(default)]
    pub formatted_html: String,
}

/// Everything needed to save a script besides the rendered document.
#[derive(Debug, Clone, Default)]
pub struct NewScript {
    pub script: String,
    pub title: String,
    pub sections: Vec<ScriptSection>,
    pub formatted_html: String,
}

impl NewScript {
    /// The raw text the record title is derived from: the first line of the
    /// first section, else the client-supplied title.
    pub fn title_source(&self) -> &str {
        self.sections
            .first()
            .and_then(|section| section.content.first())
            .map(String::as_str)
            .unwrap_or(self.title.as_str())
    }
}
