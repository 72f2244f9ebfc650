pub mod auth;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                    sync channel (WebSocket upgrade)
/// /auth/register         POST   create account, returns TOTP secret
/// /auth/login            POST   verify one-time code, issue session token
/// /auth/logout           POST   clear session token
/// /auth/account          DELETE remove account and all records
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
}
