use tabsync_core::error::CoreError;
use tabsync_core::types::DbId;
use tabsync_db::models::shortcut::CreateShortcut;
use tabsync_db::Stores;

use crate::ws::dispatcher::{ActionResult, Delivery};
use crate::ws::protocol::SyncEvent;

pub async fn add(stores: &Stores, username: &str, input: CreateShortcut) -> ActionResult {
    input.validate().map_err(CoreError::Validation)?;
    let shortcut = stores.shortcuts.create(username, input).await?;
    Ok(Delivery::Reply(SyncEvent::ShortcutAdded { shortcut }))
}

pub async fn list(stores: &Stores, username: &str) -> ActionResult {
    let shortcuts = stores.shortcuts.find_all_by_owner(username, &()).await?;
    Ok(Delivery::Reply(SyncEvent::ShortcutsRetrieved { shortcuts }))
}

pub async fn delete(stores: &Stores, username: &str, id: DbId) -> ActionResult {
    if !stores.shortcuts.delete_by_id_and_owner(id, username).await? {
        return Err(CoreError::NotFound { entity: "Shortcut", id }.into());
    }
    Ok(Delivery::Reply(SyncEvent::ShortcutDeleted { shortcut_id: id }))
}
