//! Store contracts consumed by the sync channel and the auth endpoints.
//!
//! The session store ([`UserStore`]) and the five resource collections
//! ([`ResourceStore`]) are async traits so the WebSocket core can run
//! against PostgreSQL in production and against [`memory::MemoryStore`] in
//! tests. [`Stores`] bundles one handle per collection.

use std::sync::Arc;

use async_trait::async_trait;
use tabsync_core::types::{DbId, Timestamp};

use crate::models::bookmark::Bookmark;
use crate::models::history::HistoryEntry;
use crate::models::note::Note;
use crate::models::shortcut::Shortcut;
use crate::models::tab::Tab;
use crate::models::user::{CreateUser, User};
use crate::DbPool;

pub mod memory;
pub mod postgres;
mod resource;

pub use resource::Resource;

/// Errors surfaced by any store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint was violated (duplicate username or email).
    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable per-user record holding identity, session token and ban state.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Both values must match the same record; a cleared token never matches.
    async fn find_by_username_and_token(
        &self,
        username: &str,
        token: &str,
    ) -> StoreResult<Option<User>>;

    /// Persist status, session token and ban fields of `user`.
    async fn save(&self, user: &User) -> StoreResult<()>;

    async fn delete_user(&self, username: &str) -> StoreResult<bool>;

    /// Remove `init` users created before `cutoff`.
    async fn delete_unverified_before(&self, cutoff: Timestamp) -> StoreResult<u64>;

    /// Fails when the backing database cannot be reached.
    async fn health_check(&self) -> StoreResult<()>;
}

/// Removes an account together with everything it owns.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Delete `username` and its tabs, shortcuts, history, bookmarks and
    /// notes as one unit: either all of them go or none do. Returns `false`
    /// if the user did not exist.
    async fn delete_account(&self, username: &str) -> StoreResult<bool>;
}

/// One per-user collection. Every mutation is keyed by `(id, username)` so a
/// record owned by someone else is indistinguishable from a missing one.
#[async_trait]
pub trait ResourceStore<R: Resource>: Send + Sync {
    async fn create(&self, username: &str, input: R::Create) -> StoreResult<R>;

    async fn find_all_by_owner(&self, username: &str, filter: &R::Filter) -> StoreResult<Vec<R>>;

    /// Returns `None` when no matching record exists for the owner (or the
    /// record refuses the patch, e.g. a closed tab).
    async fn update_by_id_and_owner(
        &self,
        id: DbId,
        username: &str,
        patch: R::Update,
    ) -> StoreResult<Option<R>>;

    async fn delete_by_id_and_owner(&self, id: DbId, username: &str) -> StoreResult<bool>;

    async fn delete_all_by_owner(&self, username: &str) -> StoreResult<u64>;
}

/// Handles to the session store and the five resource collections.
///
/// Cheaply cloneable; each field is an `Arc`.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tabs: Arc<dyn ResourceStore<Tab>>,
    pub shortcuts: Arc<dyn ResourceStore<Shortcut>>,
    pub history: Arc<dyn ResourceStore<HistoryEntry>>,
    pub bookmarks: Arc<dyn ResourceStore<Bookmark>>,
    pub notes: Arc<dyn ResourceStore<Note>>,
    pub accounts: Arc<dyn AccountStore>,
}

impl Stores {
    /// All collections backed by the same PostgreSQL pool.
    pub fn postgres(pool: DbPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            users: store.clone(),
            tabs: store.clone(),
            shortcuts: store.clone(),
            history: store.clone(),
            bookmarks: store.clone(),
            notes: store.clone(),
            accounts: store,
        }
    }

    /// Delete the user and every record it owns.
    ///
    /// Returns `false` if the user did not exist.
    pub async fn delete_account(&self, username: &str) -> StoreResult<bool> {
        self.accounts.delete_account(username).await
    }
}
