//! Tab actions. These are the only events fanned out to the owner's other
//! connections.

use tabsync_core::error::CoreError;
use tabsync_core::sync::{validate_group_name, TAB_STATUS_ACTIVE, TAB_STATUS_CLOSED};
use tabsync_core::types::DbId;
use tabsync_db::models::tab::{CreateTab, TabFilter, UpdateTab};
use tabsync_db::Stores;

use crate::ws::dispatcher::{ActionResult, Delivery};
use crate::ws::protocol::SyncEvent;

pub async fn create(stores: &Stores, username: &str, input: CreateTab) -> ActionResult {
    input.validate().map_err(CoreError::Validation)?;
    let tab = stores.tabs.create(username, input).await?;
    tracing::debug!(username, tab_id = tab.id, "Tab created");
    Ok(Delivery::Fanout(SyncEvent::TabCreated { tab }))
}

/// Closing an already closed tab reports not-found, like a missing one.
pub async fn close(stores: &Stores, username: &str, id: DbId) -> ActionResult {
    let patch = UpdateTab {
        status: Some(TAB_STATUS_CLOSED.to_string()),
        group: None,
    };
    stores
        .tabs
        .update_by_id_and_owner(id, username, patch)
        .await?
        .ok_or(CoreError::NotFound { entity: "Tab", id })?;
    Ok(Delivery::Fanout(SyncEvent::TabClosed { tab_id: id }))
}

/// Group names are stored trimmed, the same way `createTab` stores them.
pub async fn group(stores: &Stores, username: &str, id: DbId, new_group: String) -> ActionResult {
    validate_group_name(&new_group).map_err(CoreError::Validation)?;
    let patch = UpdateTab {
        status: None,
        group: Some(new_group.trim().to_string()),
    };
    let tab = stores
        .tabs
        .update_by_id_and_owner(id, username, patch)
        .await?
        .ok_or(CoreError::NotFound { entity: "Tab", id })?;
    Ok(Delivery::Fanout(SyncEvent::TabGrouped { tab }))
}

/// Active tabs only; closed tabs stay stored but are never restored.
pub async fn restore(stores: &Stores, username: &str) -> ActionResult {
    let filter = TabFilter {
        status: Some(TAB_STATUS_ACTIVE.to_string()),
    };
    let tabs = stores.tabs.find_all_by_owner(username, &filter).await?;
    Ok(Delivery::Reply(SyncEvent::RestoreTabs { tabs }))
}
