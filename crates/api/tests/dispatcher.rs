//! Tests for the sync action dispatcher: authorization, owner scoping,
//! delivery targets and error envelopes.

mod common;

use assert_matches::assert_matches;
use common::{assert_silent, next_json, seed_user, test_state};
use serde_json::{json, Value};
use tabsync_api::ws::dispatcher::{ActionError, Delivery};
use tabsync_api::ws::protocol::{ClientMessage, SyncEvent};
use tabsync_core::error::CoreError;
use tabsync_db::models::tab::CreateTab;
use tabsync_db::store::ResourceStore;

fn frame(action: &str, username: &str, token: &str, data: Value) -> ClientMessage {
    ClientMessage::parse(
        &json!({
            "action": action,
            "username": username,
            "sessionToken": token,
            "data": data,
        })
        .to_string(),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Cross-device tab flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tab_created_on_one_device_is_closed_from_another() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let mut a = state.registry.register("A".to_string()).await;
    let mut b = state.registry.register("B".to_string()).await;
    state.registry.bind("A", "alice").await;
    state.registry.bind("B", "alice").await;

    state
        .dispatcher
        .handle(
            "A",
            frame("createTab", "alice", "tok", json!({"title": "Docs", "url": "https://x"})),
        )
        .await;

    let on_a = next_json(&mut a).await;
    let on_b = next_json(&mut b).await;
    assert_eq!(on_a, on_b);
    assert_eq!(on_b["action"], "tabCreated");
    assert_eq!(on_b["tab"]["title"], "Docs");
    assert_eq!(on_b["tab"]["status"], "active");
    assert_eq!(on_b["tab"]["group"], "default");
    let tab_id = on_b["tab"]["id"].as_i64().unwrap();

    state
        .dispatcher
        .handle("B", frame("closeTab", "alice", "tok", json!({"id": tab_id})))
        .await;

    let closed = next_json(&mut a).await;
    assert_eq!(closed, json!({"action": "tabClosed", "tabId": tab_id}));
    assert_eq!(next_json(&mut b).await, closed);

    for (conn, rx) in [("A", &mut a), ("B", &mut b)] {
        state
            .dispatcher
            .handle(conn, frame("getTabs", "alice", "tok", Value::Null))
            .await;
        let restored = next_json(rx).await;
        assert_eq!(restored, json!({"action": "restoreTabs", "tabs": []}));
    }
}

// ---------------------------------------------------------------------------
// Delivery scope
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tab_events_reach_own_connections_only() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok-a")).await;
    seed_user(&store, "bob", Some("tok-b")).await;
    let mut a1 = state.registry.register("a1".to_string()).await;
    let mut a2 = state.registry.register("a2".to_string()).await;
    let mut b1 = state.registry.register("b1".to_string()).await;
    state.registry.bind("a1", "alice").await;
    state.registry.bind("a2", "alice").await;
    state.registry.bind("b1", "bob").await;

    state
        .dispatcher
        .handle(
            "a1",
            frame("createTab", "alice", "tok-a", json!({"title": "t", "url": "https://t"})),
        )
        .await;

    assert_eq!(next_json(&mut a1).await["action"], "tabCreated");
    assert_eq!(next_json(&mut a2).await["action"], "tabCreated");
    assert_silent(&mut a1).await;
    assert_silent(&mut b1).await;
}

#[tokio::test]
async fn unbound_origin_still_receives_its_own_tab_event() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let mut fresh = state.registry.register("fresh".to_string()).await;
    let mut bound = state.registry.register("bound".to_string()).await;
    state.registry.bind("bound", "alice").await;

    state
        .dispatcher
        .handle(
            "fresh",
            frame("createTab", "alice", "tok", json!({"title": "t", "url": "https://t"})),
        )
        .await;

    assert_eq!(next_json(&mut fresh).await["action"], "tabCreated");
    assert_eq!(next_json(&mut bound).await["action"], "tabCreated");
    assert_silent(&mut fresh).await;
}

#[tokio::test]
async fn non_tab_actions_reply_to_requester_only() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let mut a1 = state.registry.register("a1".to_string()).await;
    let mut a2 = state.registry.register("a2".to_string()).await;
    state.registry.bind("a1", "alice").await;
    state.registry.bind("a2", "alice").await;

    state
        .dispatcher
        .handle(
            "a1",
            frame("addBookmark", "alice", "tok", json!({"title": "b", "url": "https://b"})),
        )
        .await;

    let reply = next_json(&mut a1).await;
    assert_eq!(reply["action"], "bookmarkAdded");
    assert_eq!(reply["bookmark"]["title"], "b");
    assert_silent(&mut a2).await;
}

#[tokio::test]
async fn execute_reports_delivery_without_sending() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let mut rx = state.registry.register("c1".to_string()).await;
    state.registry.bind("c1", "alice").await;

    let (owner, delivery) = state
        .dispatcher
        .execute(frame("deleteHistory", "alice", "tok", Value::Null))
        .await
        .unwrap();

    assert_eq!(owner, "alice");
    assert_eq!(delivery, Delivery::Reply(SyncEvent::HistoryCleared { deleted: 0 }));
    assert_silent(&mut rx).await;
}

// ---------------------------------------------------------------------------
// Ownership and not-found
// ---------------------------------------------------------------------------

#[tokio::test]
async fn other_users_records_are_not_found_and_untouched() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok-a")).await;
    seed_user(&store, "mallory", Some("tok-m")).await;

    let (_, delivery) = state
        .dispatcher
        .execute(frame("addNote", "alice", "tok-a", json!({"title": "secret", "content": "x"})))
        .await
        .unwrap();
    let note_id = match delivery {
        Delivery::Reply(SyncEvent::NoteAdded { note }) => note.id,
        other => panic!("unexpected delivery: {other:?}"),
    };

    let update = state
        .dispatcher
        .execute(frame(
            "updateNote",
            "mallory",
            "tok-m",
            json!({"id": note_id, "content": "pwned"}),
        ))
        .await;
    assert_matches!(update, Err(ActionError::Core(CoreError::NotFound { entity: "Note", .. })));

    let delete = state
        .dispatcher
        .execute(frame("deleteNote", "mallory", "tok-m", json!({"id": note_id})))
        .await;
    assert_matches!(delete, Err(ActionError::Core(CoreError::NotFound { .. })));

    let (_, listing) = state
        .dispatcher
        .execute(frame("getNotes", "alice", "tok-a", Value::Null))
        .await
        .unwrap();
    match listing {
        Delivery::Reply(SyncEvent::NotesRetrieved { notes }) => {
            assert_eq!(notes.len(), 1);
            assert_eq!(notes[0].content, "x");
        }
        other => panic!("unexpected delivery: {other:?}"),
    }
}

#[tokio::test]
async fn closing_a_closed_tab_is_not_found_and_keeps_it_closed() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let tab = store
        .tabs
        .create(
            "alice",
            CreateTab {
                title: "t".into(),
                url: "https://t".into(),
                group: None,
                status: None,
            },
        )
        .await
        .unwrap();

    let first = state
        .dispatcher
        .execute(frame("closeTab", "alice", "tok", json!({"id": tab.id})))
        .await;
    assert_matches!(first, Ok((_, Delivery::Fanout(SyncEvent::TabClosed { .. }))));

    let second = state
        .dispatcher
        .execute(frame("closeTab", "alice", "tok", json!({"id": tab.id})))
        .await;
    assert_matches!(second, Err(ActionError::Core(CoreError::NotFound { entity: "Tab", .. })));

    let all = store.tabs.find_all_by_owner("alice", &Default::default()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, "closed");
}

#[tokio::test]
async fn not_found_is_reported_as_error_envelope() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let mut rx = state.registry.register("c1".to_string()).await;

    state
        .dispatcher
        .handle("c1", frame("deleteBookmark", "alice", "tok", json!({"id": 404})))
        .await;

    assert_eq!(
        next_json(&mut rx).await,
        json!({"status": "error", "message": "Bookmark with id 404 not found"})
    );
}

// ---------------------------------------------------------------------------
// Authorization and protocol errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stale_token_gets_logout_and_no_mutation() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("current")).await;
    let mut rx = state.registry.register("c1".to_string()).await;

    state
        .dispatcher
        .handle(
            "c1",
            frame("addShortcut", "alice", "old", json!({"title": "s", "url": "https://s"})),
        )
        .await;

    assert_eq!(next_json(&mut rx).await["status"], "logout");
    let shortcuts = store.shortcuts.find_all_by_owner("alice", &()).await.unwrap();
    assert!(shortcuts.is_empty());
}

#[tokio::test]
async fn unknown_action_is_an_error() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let mut rx = state.registry.register("c1".to_string()).await;

    state
        .dispatcher
        .handle("c1", frame("launchRocket", "alice", "tok", Value::Null))
        .await;

    let reply = next_json(&mut rx).await;
    assert_eq!(reply["status"], "error");
    assert_eq!(reply["message"], "Unknown action: launchRocket");
}

#[tokio::test]
async fn missing_credentials_is_an_error() {
    let (_store, state) = test_state();
    let mut rx = state.registry.register("c1".to_string()).await;

    let message = ClientMessage::parse(r#"{"action":"getTabs","username":"alice"}"#).unwrap();
    state.dispatcher.handle("c1", message).await;

    let reply = next_json(&mut rx).await;
    assert_eq!(reply["status"], "error");
    assert_eq!(reply["message"], "Missing sessionToken or username");
}

#[tokio::test]
async fn invalid_payload_is_rejected_without_mutation() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;

    let missing_url = state
        .dispatcher
        .execute(frame("createTab", "alice", "tok", json!({"title": "t"})))
        .await;
    assert_matches!(missing_url, Err(ActionError::Protocol(_)));

    let empty_title = state
        .dispatcher
        .execute(frame("createTab", "alice", "tok", json!({"title": "", "url": "https://t"})))
        .await;
    assert_matches!(empty_title, Err(ActionError::Core(CoreError::Validation(_))));

    let tabs = store.tabs.find_all_by_owner("alice", &Default::default()).await.unwrap();
    assert!(tabs.is_empty());
}

// ---------------------------------------------------------------------------
// Remaining collections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_is_listed_newest_first_and_cleared() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;

    for url in ["https://one", "https://two"] {
        state
            .dispatcher
            .execute(frame("addHistory", "alice", "tok", json!({"url": url})))
            .await
            .unwrap();
    }

    let (_, listing) = state
        .dispatcher
        .execute(frame("getHistory", "alice", "tok", Value::Null))
        .await
        .unwrap();
    match listing {
        Delivery::Reply(SyncEvent::HistoryRetrieved { history }) => {
            let urls: Vec<_> = history.iter().map(|h| h.url.as_str()).collect();
            assert_eq!(urls, vec!["https://two", "https://one"]);
        }
        other => panic!("unexpected delivery: {other:?}"),
    }

    let (_, cleared) = state
        .dispatcher
        .execute(frame("deleteHistory", "alice", "tok", Value::Null))
        .await
        .unwrap();
    assert_eq!(cleared, Delivery::Reply(SyncEvent::HistoryCleared { deleted: 2 }));
}

#[tokio::test]
async fn group_tab_moves_tab_and_fans_out() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let (_, created) = state
        .dispatcher
        .execute(frame("createTab", "alice", "tok", json!({"title": "t", "url": "https://t"})))
        .await
        .unwrap();
    let tab_id = match created {
        Delivery::Fanout(SyncEvent::TabCreated { tab }) => tab.id,
        other => panic!("unexpected delivery: {other:?}"),
    };

    let (_, grouped) = state
        .dispatcher
        .execute(frame("groupTab", "alice", "tok", json!({"id": tab_id, "newGroup": "work"})))
        .await
        .unwrap();

    match grouped {
        Delivery::Fanout(SyncEvent::TabGrouped { tab }) => {
            assert_eq!(tab.id, tab_id);
            assert_eq!(tab.group, "work");
        }
        other => panic!("unexpected delivery: {other:?}"),
    }
}

#[tokio::test]
async fn padded_group_names_are_stored_trimmed_on_create_and_regroup() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let (_, created) = state
        .dispatcher
        .execute(frame(
            "createTab",
            "alice",
            "tok",
            json!({"title": "t", "url": "https://t", "group": "  work  "}),
        ))
        .await
        .unwrap();
    let tab = match created {
        Delivery::Fanout(SyncEvent::TabCreated { tab }) => tab,
        other => panic!("unexpected delivery: {other:?}"),
    };
    assert_eq!(tab.group, "work");

    let (_, grouped) = state
        .dispatcher
        .execute(frame(
            "groupTab",
            "alice",
            "tok",
            json!({"id": tab.id, "newGroup": "  work  "}),
        ))
        .await
        .unwrap();

    match grouped {
        Delivery::Fanout(SyncEvent::TabGrouped { tab }) => assert_eq!(tab.group, "work"),
        other => panic!("unexpected delivery: {other:?}"),
    }
    let stored = store.tabs.find_all_by_owner("alice", &Default::default()).await.unwrap();
    assert_eq!(stored[0].group, "work");
}

#[tokio::test]
async fn shortcut_add_list_delete() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;

    let (_, added) = state
        .dispatcher
        .execute(frame("addShortcut", "alice", "tok", json!({"title": "s", "url": "https://s"})))
        .await
        .unwrap();
    let id = match added {
        Delivery::Reply(SyncEvent::ShortcutAdded { shortcut }) => shortcut.id,
        other => panic!("unexpected delivery: {other:?}"),
    };

    let (_, deleted) = state
        .dispatcher
        .execute(frame("deleteShortcut", "alice", "tok", json!({"id": id})))
        .await
        .unwrap();
    assert_eq!(deleted, Delivery::Reply(SyncEvent::ShortcutDeleted { shortcut_id: id }));

    let (_, listing) = state
        .dispatcher
        .execute(frame("getShortcuts", "alice", "tok", Value::Null))
        .await
        .unwrap();
    assert_eq!(
        listing,
        Delivery::Reply(SyncEvent::ShortcutsRetrieved { shortcuts: vec![] })
    );
}

#[tokio::test]
async fn bookmark_update_keeps_untouched_fields() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;

    let (_, added) = state
        .dispatcher
        .execute(frame("addBookmark", "alice", "tok", json!({"title": "old", "url": "https://b"})))
        .await
        .unwrap();
    let id = match added {
        Delivery::Reply(SyncEvent::BookmarkAdded { bookmark }) => bookmark.id,
        other => panic!("unexpected delivery: {other:?}"),
    };

    let (_, updated) = state
        .dispatcher
        .execute(frame("updateBookmark", "alice", "tok", json!({"id": id, "title": "new"})))
        .await
        .unwrap();
    match updated {
        Delivery::Reply(SyncEvent::BookmarkUpdated { bookmark }) => {
            assert_eq!(bookmark.title, "new");
            assert_eq!(bookmark.url, "https://b");
        }
        other => panic!("unexpected delivery: {other:?}"),
    }

    let empty_patch = state
        .dispatcher
        .execute(frame("updateBookmark", "alice", "tok", json!({"id": id})))
        .await;
    assert_matches!(empty_patch, Err(ActionError::Core(CoreError::Validation(_))));
}
