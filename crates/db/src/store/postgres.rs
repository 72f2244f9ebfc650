//! PostgreSQL-backed stores, delegating to the per-table repositories.

use std::convert::Infallible;

use async_trait::async_trait;
use tabsync_core::types::{DbId, Timestamp};

use crate::models::bookmark::{Bookmark, CreateBookmark, UpdateBookmark};
use crate::models::history::{CreateHistoryEntry, HistoryEntry};
use crate::models::note::{CreateNote, Note, UpdateNote};
use crate::models::shortcut::{CreateShortcut, Shortcut};
use crate::models::tab::{CreateTab, Tab, TabFilter, UpdateTab};
use crate::models::user::{CreateUser, User};
use crate::repositories::{BookmarkRepo, HistoryRepo, NoteRepo, ShortcutRepo, TabRepo, UserRepo};
use crate::store::{AccountStore, ResourceStore, StoreError, StoreResult, UserStore};
use crate::DbPool;

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Store implementation over a shared connection pool.
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Turn unique-constraint violations (`uq_*`) into [`StoreError::Conflict`].
fn classify_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return StoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        UserRepo::create(&self.pool, input)
            .await
            .map_err(classify_insert_error)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_username_and_token(
        &self,
        username: &str,
        token: &str,
    ) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_username_and_token(&self.pool, username, token).await?)
    }

    async fn save(&self, user: &User) -> StoreResult<()> {
        if !UserRepo::save_session_state(&self.pool, user).await? {
            tracing::warn!(username = %user.username, "Save skipped: user no longer exists");
        }
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> StoreResult<bool> {
        Ok(UserRepo::delete_by_username(&self.pool, username).await?)
    }

    async fn delete_unverified_before(&self, cutoff: Timestamp) -> StoreResult<u64> {
        Ok(UserRepo::delete_unverified_before(&self.pool, cutoff).await?)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn delete_account(&self, username: &str) -> StoreResult<bool> {
        match UserRepo::delete_with_records(&self.pool, username).await? {
            Some(records) => {
                tracing::debug!(username, records, "Deleted account and owned records");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ResourceStore<Tab> for PgStore {
    async fn create(&self, username: &str, input: CreateTab) -> StoreResult<Tab> {
        Ok(TabRepo::create(&self.pool, username, &input).await?)
    }

    async fn find_all_by_owner(&self, username: &str, filter: &TabFilter) -> StoreResult<Vec<Tab>> {
        Ok(TabRepo::list_by_owner(&self.pool, username, filter).await?)
    }

    async fn update_by_id_and_owner(
        &self,
        id: DbId,
        username: &str,
        patch: UpdateTab,
    ) -> StoreResult<Option<Tab>> {
        Ok(TabRepo::update(&self.pool, id, username, &patch).await?)
    }

    async fn delete_by_id_and_owner(&self, id: DbId, username: &str) -> StoreResult<bool> {
        Ok(TabRepo::delete(&self.pool, id, username).await?)
    }

    async fn delete_all_by_owner(&self, username: &str) -> StoreResult<u64> {
        Ok(TabRepo::delete_all_by_owner(&self.pool, username).await?)
    }
}

#[async_trait]
impl ResourceStore<Shortcut> for PgStore {
    async fn create(&self, username: &str, input: CreateShortcut) -> StoreResult<Shortcut> {
        Ok(ShortcutRepo::create(&self.pool, username, &input).await?)
    }

    async fn find_all_by_owner(&self, username: &str, _filter: &()) -> StoreResult<Vec<Shortcut>> {
        Ok(ShortcutRepo::list_by_owner(&self.pool, username).await?)
    }

    async fn update_by_id_and_owner(
        &self,
        _id: DbId,
        _username: &str,
        patch: Infallible,
    ) -> StoreResult<Option<Shortcut>> {
        match patch {}
    }

    async fn delete_by_id_and_owner(&self, id: DbId, username: &str) -> StoreResult<bool> {
        Ok(ShortcutRepo::delete(&self.pool, id, username).await?)
    }

    async fn delete_all_by_owner(&self, username: &str) -> StoreResult<u64> {
        Ok(ShortcutRepo::delete_all_by_owner(&self.pool, username).await?)
    }
}

#[async_trait]
impl ResourceStore<HistoryEntry> for PgStore {
    async fn create(&self, username: &str, input: CreateHistoryEntry) -> StoreResult<HistoryEntry> {
        Ok(HistoryRepo::create(&self.pool, username, &input).await?)
    }

    async fn find_all_by_owner(
        &self,
        username: &str,
        _filter: &(),
    ) -> StoreResult<Vec<HistoryEntry>> {
        Ok(HistoryRepo::list_by_owner(&self.pool, username).await?)
    }

    async fn update_by_id_and_owner(
        &self,
        _id: DbId,
        _username: &str,
        patch: Infallible,
    ) -> StoreResult<Option<HistoryEntry>> {
        match patch {}
    }

    async fn delete_by_id_and_owner(&self, id: DbId, username: &str) -> StoreResult<bool> {
        Ok(HistoryRepo::delete(&self.pool, id, username).await?)
    }

    async fn delete_all_by_owner(&self, username: &str) -> StoreResult<u64> {
        Ok(HistoryRepo::delete_all_by_owner(&self.pool, username).await?)
    }
}

#[async_trait]
impl ResourceStore<Bookmark> for PgStore {
    async fn create(&self, username: &str, input: CreateBookmark) -> StoreResult<Bookmark> {
        Ok(BookmarkRepo::create(&self.pool, username, &input).await?)
    }

    async fn find_all_by_owner(&self, username: &str, _filter: &()) -> StoreResult<Vec<Bookmark>> {
        Ok(BookmarkRepo::list_by_owner(&self.pool, username).await?)
    }

    async fn update_by_id_and_owner(
        &self,
        id: DbId,
        username: &str,
        patch: UpdateBookmark,
    ) -> StoreResult<Option<Bookmark>> {
        Ok(BookmarkRepo::update(&self.pool, id, username, &patch).await?)
    }

    async fn delete_by_id_and_owner(&self, id: DbId, username: &str) -> StoreResult<bool> {
        Ok(BookmarkRepo::delete(&self.pool, id, username).await?)
    }

    async fn delete_all_by_owner(&self, username: &str) -> StoreResult<u64> {
        Ok(BookmarkRepo::delete_all_by_owner(&self.pool, username).await?)
    }
}

#[async_trait]
impl ResourceStore<Note> for PgStore {
    async fn create(&self, username: &str, input: CreateNote) -> StoreResult<Note> {
        Ok(NoteRepo::create(&self.pool, username, &input).await?)
    }

    async fn find_all_by_owner(&self, username: &str, _filter: &()) -> StoreResult<Vec<Note>> {
        Ok(NoteRepo::list_by_owner(&self.pool, username).await?)
    }

    async fn update_by_id_and_owner(
        &self,
        id: DbId,
        username: &str,
        patch: UpdateNote,
    ) -> StoreResult<Option<Note>> {
        Ok(NoteRepo::update(&self.pool, id, username, &patch).await?)
    }

    async fn delete_by_id_and_owner(&self, id: DbId, username: &str) -> StoreResult<bool> {
        Ok(NoteRepo::delete(&self.pool, id, username).await?)
    }

    async fn delete_all_by_owner(&self, username: &str) -> StoreResult<u64> {
        Ok(NoteRepo::delete_all_by_owner(&self.pool, username).await?)
    }
}
