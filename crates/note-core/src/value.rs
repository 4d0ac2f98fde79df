use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::{Document, History};
use crate::session::SessionRecord;

const DEFAULT_VERSION: u32 = 1;

/// Extensions offered by the file pickers, without the dot.
pub const NOTE_FILE_EXTENSIONS: [&str; 2] = ["mnote", "json"];
pub const DEFAULT_FILE_NAME: &str = "Untitled";

fn default_version() -> u32 {
    DEFAULT_VERSION
}

fn default_history() -> Value {
    serde_json::json!({ "undos": [], "redos": [] })
}

/// `null` and a missing field both mean the initial one-paragraph document.
fn content_or_initial<'de, D>(deserializer: D) -> Result<Document, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Document>::deserialize(deserializer)?.unwrap_or_else(Document::empty))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMeta {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Unix milliseconds of the save that wrote this file.
    #[serde(default)]
    pub created: i64,
}

impl Default for FileMeta {
    fn default() -> Self {
        Self {
            version: default_version(),
            created: 0,
        }
    }
}

/// On-disk note: document, opaque undo history, past sessions and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteFile {
    #[serde(default = "Document::empty", deserialize_with = "content_or_initial")]
    pub content: Document,
    /// Written and read back as-is; only interpreted when it parses as a
    /// [`History`].
    #[serde(default = "default_history")]
    pub history: Value,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub meta: FileMeta,
}

impl NoteFile {
    pub fn new(content: Document, history: &History, sessions: Vec<SessionRecord>, created: i64) -> Self {
        Self {
            content,
            history: serde_json::to_value(history).unwrap_or_else(|_| default_history()),
            sessions,
            meta: FileMeta {
                version: default_version(),
                created,
            },
        }
    }

    /// The undo history, if the stored value is one this editor understands.
    pub fn history(&self) -> Option<History> {
        if self.history.get("undos").is_none() {
            return None;
        }
        match serde_json::from_value(self.history.clone()) {
            Ok(history) => Some(history),
            Err(err) => {
                tracing::debug!("ignoring unreadable history: {err}");
                None
            }
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
