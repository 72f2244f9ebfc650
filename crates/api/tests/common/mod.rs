#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::extract::ws::Message;
use axum::http::{header::CONTENT_TYPE, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

use tabsync_api::auth::totp;
use tabsync_api::config::ServerConfig;
use tabsync_api::router::build_app_router;
use tabsync_api::state::AppState;
use tabsync_db::models::user::{CreateUser, User};
use tabsync_db::store::memory::MemoryStore;
use tabsync_db::store::UserStore;

/// Session check delay used by every test state.
pub const CHECK_DELAY_MS: u64 = 50;

/// Build a test `ServerConfig` with safe defaults and a short session check
/// delay.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        session_check_delay_ms: CHECK_DELAY_MS,
        totp_issuer: "tabsync".to_string(),
        unverified_retention_hours: 24,
    }
}

/// Application state over a fresh in-memory store. The store handle is
/// returned too so tests can seed data and inspect counters.
pub fn test_state() -> (MemoryStore, AppState) {
    let store = MemoryStore::new();
    let state = AppState::new(store.stores(), test_config());
    (store, state)
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

/// Create a user with a real TOTP secret and, optionally, a live session
/// token.
pub async fn seed_user(store: &MemoryStore, username: &str, token: Option<&str>) -> User {
    let mut user = store
        .users
        .create_user(&CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            totp_secret: totp::generate_secret(),
        })
        .await
        .expect("user creation should succeed");
    if let Some(token) = token {
        user.session_token = Some(token.to_string());
        store.users.save(&user).await.expect("save should succeed");
    }
    user
}

/// Current one-time code for `secret`.
pub fn current_code(secret: &str, username: &str) -> String {
    totp::build_totp(secret, "tabsync", username)
        .expect("secret should be valid")
        .generate_current()
        .expect("clock should be sane")
}

/// Wait comfortably past the session check delay.
pub async fn wait_for_check() {
    tokio::time::sleep(Duration::from_millis(CHECK_DELAY_MS * 4)).await;
}

// ---------------------------------------------------------------------------
// Registry receivers
// ---------------------------------------------------------------------------

/// Next text frame on a registry channel, parsed as JSON.
pub async fn next_json(rx: &mut UnboundedReceiver<Message>) -> serde_json::Value {
    let message = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("channel closed");
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).expect("valid JSON"),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

/// Assert nothing arrives on `rx` for a short while.
pub async fn assert_silent(rx: &mut UnboundedReceiver<Message>) {
    let result = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(result.is_err(), "expected no message, got {result:?}");
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
