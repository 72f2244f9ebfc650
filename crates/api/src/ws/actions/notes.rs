use tabsync_core::error::CoreError;
use tabsync_core::types::DbId;
use tabsync_db::models::note::{CreateNote, UpdateNote};
use tabsync_db::Stores;

use crate::ws::dispatcher::{ActionResult, Delivery};
use crate::ws::protocol::SyncEvent;

pub async fn add(stores: &Stores, username: &str, input: CreateNote) -> ActionResult {
    input.validate().map_err(CoreError::Validation)?;
    let note = stores.notes.create(username, input).await?;
    Ok(Delivery::Reply(SyncEvent::NoteAdded { note }))
}

pub async fn update(stores: &Stores, username: &str, id: DbId, patch: UpdateNote) -> ActionResult {
    patch.validate().map_err(CoreError::Validation)?;
    let note = stores
        .notes
        .update_by_id_and_owner(id, username, patch)
        .await?
        .ok_or(CoreError::NotFound { entity: "Note", id })?;
    Ok(Delivery::Reply(SyncEvent::NoteUpdated { note }))
}

pub async fn delete(stores: &Stores, username: &str, id: DbId) -> ActionResult {
    if !stores.notes.delete_by_id_and_owner(id, username).await? {
        return Err(CoreError::NotFound { entity: "Note", id }.into());
    }
    Ok(Delivery::Reply(SyncEvent::NoteDeleted { note_id: id }))
}

pub async fn list(stores: &Stores, username: &str) -> ActionResult {
    let notes = stores.notes.find_all_by_owner(username, &()).await?;
    Ok(Delivery::Reply(SyncEvent::NotesRetrieved { notes }))
}
