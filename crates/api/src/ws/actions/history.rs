use tabsync_core::error::CoreError;
use tabsync_db::models::history::CreateHistoryEntry;
use tabsync_db::Stores;

use crate::ws::dispatcher::{ActionResult, Delivery};
use crate::ws::protocol::SyncEvent;

pub async fn add(stores: &Stores, username: &str, input: CreateHistoryEntry) -> ActionResult {
    input.validate().map_err(CoreError::Validation)?;
    let entry = stores.history.create(username, input).await?;
    Ok(Delivery::Reply(SyncEvent::HistoryAdded { entry }))
}

/// Newest first.
pub async fn list(stores: &Stores, username: &str) -> ActionResult {
    let history = stores.history.find_all_by_owner(username, &()).await?;
    Ok(Delivery::Reply(SyncEvent::HistoryRetrieved { history }))
}

/// Clears the whole history of the user. Clearing an empty history succeeds
/// with `deleted: 0`.
pub async fn clear(stores: &Stores, username: &str) -> ActionResult {
    let deleted = stores.history.delete_all_by_owner(username).await?;
    tracing::debug!(username, deleted, "History cleared");
    Ok(Delivery::Reply(SyncEvent::HistoryCleared { deleted }))
}
