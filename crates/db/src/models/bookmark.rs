//! Bookmark entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tabsync_core::sync::{validate_title, validate_url};
use tabsync_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: DbId,
    pub username: String,
    pub title: String,
    pub url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmark {
    pub title: String,
    pub url: String,
}

/// DTO for updating a bookmark. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookmark {
    pub title: Option<String>,
    pub url: Option<String>,
}

impl CreateBookmark {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_url(&self.url)
    }
}

impl UpdateBookmark {
    /// At least one field must be present; present fields follow the create
    /// rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_none() && self.url.is_none() {
            return Err("Nothing to update: provide title or url".to_string());
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(url) = &self.url {
            validate_url(url)?;
        }
        Ok(())
    }
}
