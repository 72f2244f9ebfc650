use std::convert::Infallible;

use tabsync_core::sync::{resolve_tab_group, TAB_STATUS_ACTIVE};
use tabsync_core::types::{DbId, Timestamp};

use crate::models::bookmark::{Bookmark, CreateBookmark, UpdateBookmark};
use crate::models::history::{CreateHistoryEntry, HistoryEntry};
use crate::models::note::{CreateNote, Note, UpdateNote};
use crate::models::shortcut::{CreateShortcut, Shortcut};
use crate::models::tab::{CreateTab, Tab, TabFilter, UpdateTab};

/// A record type stored in a per-user collection.
///
/// The associated types name the create DTO, the patch and the listing
/// filter. `build`, `matches` and `apply` mirror what the SQL in the
/// repositories does, so non-SQL stores behave identically.
pub trait Resource: Clone + Send + Sync + 'static {
    type Create: Send + Sync + 'static;
    /// `Infallible` for append-only collections.
    type Update: Send + Sync + 'static;
    type Filter: Default + Send + Sync + 'static;

    /// Listing order: `true` for newest first, `false` for insertion order.
    const NEWEST_FIRST: bool;

    fn owner(&self) -> &str;
    fn build(id: DbId, username: &str, input: Self::Create, now: Timestamp) -> Self;
    fn matches(&self, filter: &Self::Filter) -> bool;
    /// Apply `patch` in place. Returns `false` if the record refuses it.
    fn apply(&mut self, patch: &Self::Update, now: Timestamp) -> bool;
}

impl Resource for Tab {
    type Create = CreateTab;
    type Update = UpdateTab;
    type Filter = TabFilter;
    const NEWEST_FIRST: bool = false;

    fn owner(&self) -> &str {
        &self.username
    }

    fn build(id: DbId, username: &str, input: CreateTab, now: Timestamp) -> Self {
        Tab {
            id,
            username: username.to_string(),
            group: resolve_tab_group(input.group.as_deref()),
            status: input
                .status
                .unwrap_or_else(|| TAB_STATUS_ACTIVE.to_string()),
            title: input.title,
            url: input.url,
            created_at: now,
            updated_at: now,
        }
    }

    fn matches(&self, filter: &TabFilter) -> bool {
        match &filter.status {
            Some(status) => *status == self.status,
            None => true,
        }
    }

    fn apply(&mut self, patch: &UpdateTab, now: Timestamp) -> bool {
        // Closed tabs are final.
        if self.status != TAB_STATUS_ACTIVE {
            return false;
        }
        if let Some(status) = &patch.status {
            self.status = status.clone();
        }
        if let Some(group) = &patch.group {
            self.group = group.clone();
        }
        self.updated_at = now;
        true
    }
}

impl Resource for Shortcut {
    type Create = CreateShortcut;
    type Update = Infallible;
    type Filter = ();
    const NEWEST_FIRST: bool = false;

    fn owner(&self) -> &str {
        &self.username
    }

    fn build(id: DbId, username: &str, input: CreateShortcut, now: Timestamp) -> Self {
        Shortcut {
            id,
            username: username.to_string(),
            title: input.title,
            url: input.url,
            created_at: now,
        }
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }

    fn apply(&mut self, patch: &Infallible, _now: Timestamp) -> bool {
        match *patch {}
    }
}

impl Resource for HistoryEntry {
    type Create = CreateHistoryEntry;
    type Update = Infallible;
    type Filter = ();
    const NEWEST_FIRST: bool = true;

    fn owner(&self) -> &str {
        &self.username
    }

    fn build(id: DbId, username: &str, input: CreateHistoryEntry, now: Timestamp) -> Self {
        HistoryEntry {
            id,
            username: username.to_string(),
            title: input.title,
            url: input.url,
            created_at: now,
        }
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }

    fn apply(&mut self, patch: &Infallible, _now: Timestamp) -> bool {
        match *patch {}
    }
}

impl Resource for Bookmark {
    type Create = CreateBookmark;
    type Update = UpdateBookmark;
    type Filter = ();
    const NEWEST_FIRST: bool = true;

    fn owner(&self) -> &str {
        &self.username
    }

    fn build(id: DbId, username: &str, input: CreateBookmark, now: Timestamp) -> Self {
        Bookmark {
            id,
            username: username.to_string(),
            title: input.title,
            url: input.url,
            created_at: now,
            updated_at: now,
        }
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }

    fn apply(&mut self, patch: &UpdateBookmark, now: Timestamp) -> bool {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        self.updated_at = now;
        true
    }
}

impl Resource for Note {
    type Create = CreateNote;
    type Update = UpdateNote;
    type Filter = ();
    const NEWEST_FIRST: bool = true;

    fn owner(&self) -> &str {
        &self.username
    }

    fn build(id: DbId, username: &str, input: CreateNote, now: Timestamp) -> Self {
        Note {
            id,
            username: username.to_string(),
            title: input.title,
            content: input.content,
            created_at: now,
            updated_at: now,
        }
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }

    fn apply(&mut self, patch: &UpdateNote, now: Timestamp) -> bool {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        self.updated_at = now;
        true
    }
}
