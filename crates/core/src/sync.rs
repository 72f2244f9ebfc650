//! Sync-domain constants and validation helpers (tabs, shortcuts, history,
//! bookmarks, notes).

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// Tab is open on some device.
pub const TAB_STATUS_ACTIVE: &str = "active";
/// Tab was closed; kept for history but hidden from `getTabs`.
pub const TAB_STATUS_CLOSED: &str = "closed";

/// All valid tab statuses.
pub const VALID_TAB_STATUSES: &[&str] = &[TAB_STATUS_ACTIVE, TAB_STATUS_CLOSED];

/// Group assigned to tabs created without one.
pub const DEFAULT_TAB_GROUP: &str = "default";

/// Maximum length of a tab group name.
pub const MAX_GROUP_NAME_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Shared field limits
// ---------------------------------------------------------------------------

/// Maximum length of a record title.
pub const MAX_TITLE_LENGTH: usize = 500;

/// Maximum length of a stored URL.
pub const MAX_URL_LENGTH: usize = 4096;

/// Maximum length of note content in characters.
pub const MAX_NOTE_CONTENT_LENGTH: usize = 20_000;

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate that the tab status is one of the allowed values.
pub fn validate_tab_status(status: &str) -> Result<(), String> {
    if VALID_TAB_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid tab status '{status}'. Must be one of: {}",
            VALID_TAB_STATUSES.join(", ")
        ))
    }
}

/// Resolve the group a tab should be stored under.
///
/// Blank or missing groups fall back to [`DEFAULT_TAB_GROUP`].
pub fn resolve_tab_group(group: Option<&str>) -> String {
    match group.map(str::trim) {
        Some(g) if !g.is_empty() => g.to_string(),
        _ => DEFAULT_TAB_GROUP.to_string(),
    }
}

/// Validate a group name supplied for an existing tab.
pub fn validate_group_name(group: &str) -> Result<(), String> {
    let trimmed = group.trim();
    if trimmed.is_empty() {
        return Err("Group name cannot be empty".to_string());
    }
    if trimmed.len() > MAX_GROUP_NAME_LENGTH {
        return Err(format!(
            "Group name exceeds maximum length of {MAX_GROUP_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate a record title: non-empty (after trimming) and within the limit.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate a URL: non-empty and within the limit.
///
/// Any scheme is accepted (`about:`, `chrome://`, `file://` pages are synced
/// as-is).
pub fn validate_url(url: &str) -> Result<(), String> {
    if url.trim().is_empty() {
        return Err("URL cannot be empty".to_string());
    }
    if url.len() > MAX_URL_LENGTH {
        return Err(format!(
            "URL exceeds maximum length of {MAX_URL_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate note content. Empty content is allowed.
pub fn validate_note_content(content: &str) -> Result<(), String> {
    if content.len() > MAX_NOTE_CONTENT_LENGTH {
        return Err(format!(
            "Note content exceeds maximum length of {MAX_NOTE_CONTENT_LENGTH} characters"
        ));
    }
    Ok(())
}
