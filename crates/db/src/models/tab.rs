//! Tab entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tabsync_core::sync::{validate_tab_status, validate_title, validate_url};
use tabsync_core::types::{DbId, Timestamp};

/// A browser tab synced across the owner's devices.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: DbId,
    pub username: String,
    pub title: String,
    pub url: String,
    #[sqlx(rename = "tab_group")]
    pub group: String,
    /// `active` or `closed`.
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a tab. `group` defaults to `"default"`, `status` to
/// `"active"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTab {
    pub title: String,
    pub url: String,
    pub group: Option<String>,
    pub status: Option<String>,
}

impl CreateTab {
    /// Check required fields and the optional status.
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_url(&self.url)?;
        if let Some(status) = &self.status {
            validate_tab_status(status)?;
        }
        Ok(())
    }
}

/// Patch applied to an active tab. Closed tabs are never updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateTab {
    pub status: Option<String>,
    pub group: Option<String>,
}

/// Listing filter for tabs.
#[derive(Debug, Clone, Default)]
pub struct TabFilter {
    pub status: Option<String>,
}
