//! End-to-end tests over a real socket: the server is bound to an ephemeral
//! port and driven with a tokio-tungstenite client.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use common::{build_test_app, seed_user, test_state};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tabsync_api::state::AppState;
use tabsync_db::store::UserStore;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_test_app(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/api/v1/ws")).await.unwrap();
    client
}

async fn send(client: &mut Client, frame: Value) {
    client.send(Message::Text(frame.to_string().into())).await.unwrap();
}

/// Next JSON text frame, skipping control frames.
async fn recv(client: &mut Client) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Read `n` frames; their relative order depends on the check timer.
async fn recv_n(client: &mut Client, n: usize) -> Vec<Value> {
    let mut frames = Vec::with_capacity(n);
    for _ in 0..n {
        frames.push(recv(client).await);
    }
    frames
}

fn get_tabs(token: &str) -> Value {
    json!({"action": "getTabs", "username": "alice", "sessionToken": token})
}

#[tokio::test]
async fn tab_created_on_one_socket_arrives_on_the_other() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let addr = spawn_server(state).await;

    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    // Each socket gets its listing immediately and a `valid` verdict once the
    // check fires, which binds it to alice.
    for client in [&mut a, &mut b] {
        send(client, get_tabs("tok")).await;
        let frames = recv_n(client, 2).await;
        assert!(frames.iter().any(|f| f["action"] == "restoreTabs"));
        assert!(frames.iter().any(|f| f["status"] == "valid"));
    }

    send(
        &mut a,
        json!({
            "action": "createTab",
            "username": "alice",
            "sessionToken": "tok",
            "data": {"title": "Docs", "url": "https://x"},
        }),
    )
    .await;

    let on_b = recv(&mut b).await;
    assert_eq!(on_b["action"], "tabCreated");
    assert_eq!(on_b["tab"]["title"], "Docs");
    assert_eq!(on_b["tab"]["status"], "active");
}

#[tokio::test]
async fn stale_token_is_logged_out_and_session_revoked() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("current")).await;
    let addr = spawn_server(state).await;

    let mut client = connect(addr).await;
    send(&mut client, get_tabs("stale")).await;

    // One logout from the handler, one from the session check.
    let frames = recv_n(&mut client, 2).await;
    assert!(frames.iter().all(|f| f["status"] == "logout"), "{frames:?}");

    let alice = store.users.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(alice.session_token, None);
}

#[tokio::test]
async fn garbage_frame_gets_error_and_connection_stays_open() {
    let (store, state) = test_state();
    seed_user(&store, "alice", Some("tok")).await;
    let addr = spawn_server(state).await;

    let mut client = connect(addr).await;
    client.send(Message::Text("{not json".into())).await.unwrap();

    let reply = recv(&mut client).await;
    assert_eq!(reply["status"], "error");

    send(&mut client, get_tabs("tok")).await;
    let frames = recv_n(&mut client, 2).await;
    assert!(frames.iter().any(|f| f["action"] == "restoreTabs"));
}
