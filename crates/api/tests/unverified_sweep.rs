mod common;

use chrono::{Duration, Utc};
use common::seed_user;
use tabsync_api::background::unverified_sweep::sweep_once;
use tabsync_core::account::USER_STATUS_VERIFIED;
use tabsync_db::store::memory::MemoryStore;
use tabsync_db::store::UserStore;

#[tokio::test]
async fn sweep_removes_only_stale_unverified_accounts() {
    let store = MemoryStore::new();
    seed_user(&store, "lurker", None).await;
    let mut verified = seed_user(&store, "regular", None).await;
    verified.user_status = USER_STATUS_VERIFIED.to_string();
    store.users.save(&verified).await.unwrap();

    // Nothing is old enough yet.
    let deleted = sweep_once(store.users.as_ref(), 24, Utc::now()).await.unwrap();
    assert_eq!(deleted, 0);

    // A day and a bit later the init account is past retention.
    let later = Utc::now() + Duration::hours(25);
    let deleted = sweep_once(store.users.as_ref(), 24, later).await.unwrap();
    assert_eq!(deleted, 1);

    assert!(store.users.find_by_username("lurker").await.unwrap().is_none());
    assert!(store.users.find_by_username("regular").await.unwrap().is_some());
}
