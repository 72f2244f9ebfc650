//! In-process stores with the same semantics as the PostgreSQL ones.
//!
//! Used by the API crate's tests and handy for running the server without a
//! database. State lives behind `tokio::sync::RwLock`s and is lost on drop.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tabsync_core::account::USER_STATUS_INIT;
use tabsync_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use crate::models::bookmark::Bookmark;
use crate::models::history::HistoryEntry;
use crate::models::note::Note;
use crate::models::shortcut::Shortcut;
use crate::models::tab::Tab;
use crate::models::user::{CreateUser, User};
use crate::store::{
    AccountStore, Resource, ResourceStore, StoreError, StoreResult, Stores, UserStore,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Users keyed by username.
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
    next_id: AtomicI64,
    username_lookups: AtomicUsize,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            username_lookups: AtomicUsize::new(0),
        }
    }

    /// Number of [`UserStore::find_by_username`] calls served so far.
    pub fn username_lookups(&self) -> usize {
        self.username_lookups.load(Ordering::SeqCst)
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&input.username) {
            return Err(StoreError::Conflict(
                "Duplicate value violates unique constraint: uq_users_username".into(),
            ));
        }
        if users.values().any(|u| u.email == input.email) {
            return Err(StoreError::Conflict(
                "Duplicate value violates unique constraint: uq_users_email".into(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: input.username.clone(),
            email: input.email.clone(),
            totp_secret: input.totp_secret.clone(),
            user_status: USER_STATUS_INIT.to_string(),
            session_token: None,
            ban_ip: None,
            ban_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.username_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username_and_token(
        &self,
        username: &str,
        token: &str,
    ) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .get(username)
            .filter(|u| u.session_token.as_deref() == Some(token))
            .cloned())
    }

    async fn save(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if let Some(stored) = users.get_mut(&user.username) {
            stored.user_status = user.user_status.clone();
            stored.session_token = user.session_token.clone();
            stored.ban_ip = user.ban_ip.clone();
            stored.ban_expires_at = user.ban_expires_at;
            stored.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> StoreResult<bool> {
        Ok(self.users.write().await.remove(username).is_some())
    }

    async fn delete_unverified_before(&self, cutoff: Timestamp) -> StoreResult<u64> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|_, u| !(u.user_status == USER_STATUS_INIT && u.created_at < cutoff));
        Ok((before - users.len()) as u64)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Resource collections
// ---------------------------------------------------------------------------

/// One collection of `R`, ids assigned sequentially from 1.
pub struct MemoryCollection<R> {
    rows: RwLock<BTreeMap<DbId, R>>,
    next_id: AtomicI64,
}

impl<R> MemoryCollection<R> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<R> Default for MemoryCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Resource> ResourceStore<R> for MemoryCollection<R> {
    async fn create(&self, username: &str, input: R::Create) -> StoreResult<R> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = R::build(id, username, input, Utc::now());
        self.rows.write().await.insert(id, row.clone());
        Ok(row)
    }

    async fn find_all_by_owner(&self, username: &str, filter: &R::Filter) -> StoreResult<Vec<R>> {
        let rows = self.rows.read().await;
        let mut found: Vec<R> = rows
            .values()
            .filter(|r| r.owner() == username && r.matches(filter))
            .cloned()
            .collect();
        if R::NEWEST_FIRST {
            found.reverse();
        }
        Ok(found)
    }

    async fn update_by_id_and_owner(
        &self,
        id: DbId,
        username: &str,
        patch: R::Update,
    ) -> StoreResult<Option<R>> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&id).filter(|r| r.owner() == username) else {
            return Ok(None);
        };
        if !row.apply(&patch, Utc::now()) {
            return Ok(None);
        }
        Ok(Some(row.clone()))
    }

    async fn delete_by_id_and_owner(&self, id: DbId, username: &str) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        if rows.get(&id).is_some_and(|r| r.owner() == username) {
            rows.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete_all_by_owner(&self, username: &str) -> StoreResult<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, r| r.owner() != username);
        Ok((before - rows.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// All six in-memory stores, kept as concrete `Arc`s so tests can inspect
/// them after handing [`MemoryStore::stores`] to the server.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub users: Arc<MemoryUserStore>,
    pub tabs: Arc<MemoryCollection<Tab>>,
    pub shortcuts: Arc<MemoryCollection<Shortcut>>,
    pub history: Arc<MemoryCollection<HistoryEntry>>,
    pub bookmarks: Arc<MemoryCollection<Bookmark>>,
    pub notes: Arc<MemoryCollection<Note>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type-erased handles sharing this store's state.
    pub fn stores(&self) -> Stores {
        Stores {
            users: self.users.clone(),
            tabs: self.tabs.clone(),
            shortcuts: self.shortcuts.clone(),
            history: self.history.clone(),
            bookmarks: self.bookmarks.clone(),
            notes: self.notes.clone(),
            accounts: Arc::new(self.clone()),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    /// Holds the user map's write lock for the whole removal, so session
    /// lookups for the user wait and then miss.
    async fn delete_account(&self, username: &str) -> StoreResult<bool> {
        let mut users = self.users.users.write().await;
        if users.remove(username).is_none() {
            return Ok(false);
        }
        let records = self.tabs.delete_all_by_owner(username).await?
            + self.shortcuts.delete_all_by_owner(username).await?
            + self.history.delete_all_by_owner(username).await?
            + self.bookmarks.delete_all_by_owner(username).await?
            + self.notes.delete_all_by_owner(username).await?;
        tracing::debug!(username, records, "Deleted account and owned records");
        Ok(true)
    }
}
