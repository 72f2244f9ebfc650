//! Note entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tabsync_core::sync::{validate_note_content, validate_title};
use tabsync_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: DbId,
    pub username: String,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNote {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// DTO for updating a note. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNote {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl CreateNote {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_note_content(&self.content)
    }
}

impl UpdateNote {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_none() && self.content.is_none() {
            return Err("Nothing to update: provide title or content".to_string());
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(content) = &self.content {
            validate_note_content(content)?;
        }
        Ok(())
    }
}
