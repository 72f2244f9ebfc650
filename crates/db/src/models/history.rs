//! Browsing history entry model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tabsync_core::sync::{validate_url, MAX_TITLE_LENGTH};
use tabsync_core::types::{DbId, Timestamp};

/// One visited page. History is append-only; the owner can only clear it as
/// a whole.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: DbId,
    pub username: String,
    pub title: String,
    pub url: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHistoryEntry {
    #[serde(default)]
    pub title: String,
    pub url: String,
}

impl CreateHistoryEntry {
    /// Untitled pages are recorded with an empty title; only the URL is
    /// required.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.len() > MAX_TITLE_LENGTH {
            return Err(format!(
                "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
            ));
        }
        validate_url(&self.url)
    }
}
