use tabsync_core::error::CoreError;
use tabsync_core::types::DbId;
use tabsync_db::models::bookmark::{CreateBookmark, UpdateBookmark};
use tabsync_db::Stores;

use crate::ws::dispatcher::{ActionResult, Delivery};
use crate::ws::protocol::SyncEvent;

pub async fn add(stores: &Stores, username: &str, input: CreateBookmark) -> ActionResult {
    input.validate().map_err(CoreError::Validation)?;
    let bookmark = stores.bookmarks.create(username, input).await?;
    Ok(Delivery::Reply(SyncEvent::BookmarkAdded { bookmark }))
}

pub async fn update(
    stores: &Stores,
    username: &str,
    id: DbId,
    patch: UpdateBookmark,
) -> ActionResult {
    patch.validate().map_err(CoreError::Validation)?;
    let bookmark = stores
        .bookmarks
        .update_by_id_and_owner(id, username, patch)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Bookmark",
            id,
        })?;
    Ok(Delivery::Reply(SyncEvent::BookmarkUpdated { bookmark }))
}

pub async fn delete(stores: &Stores, username: &str, id: DbId) -> ActionResult {
    if !stores.bookmarks.delete_by_id_and_owner(id, username).await? {
        return Err(CoreError::NotFound {
            entity: "Bookmark",
            id,
        }
        .into());
    }
    Ok(Delivery::Reply(SyncEvent::BookmarkDeleted { bookmark_id: id }))
}

pub async fn list(stores: &Stores, username: &str) -> ActionResult {
    let bookmarks = stores.bookmarks.find_all_by_owner(username, &()).await?;
    Ok(Delivery::Reply(SyncEvent::BookmarksRetrieved { bookmarks }))
}
