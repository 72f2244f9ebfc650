//! Shortcut entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tabsync_core::sync::{validate_title, validate_url};
use tabsync_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortcut {
    pub id: DbId,
    pub username: String,
    pub title: String,
    pub url: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortcut {
    pub title: String,
    pub url: String,
}

impl CreateShortcut {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_url(&self.url)
    }
}
