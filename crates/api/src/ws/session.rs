//! Debounced re-authentication of sync connections.
//!
//! Every inbound frame carrying credentials restarts a per-connection timer.
//! When a connection has been quiet for the configured delay, its last claimed
//! `(username, sessionToken)` pair is checked against the session store:
//!
//! - unknown user, or a user with no token: the connection is unbound and told
//!   to log out;
//! - a token that differs from the stored one: the session was taken over.
//!   The stored token is cleared, every connection of the user is told to log
//!   out and unbound;
//! - otherwise the connection is bound to the user and told `valid`.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use tabsync_db::Stores;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::ws::manager::ConnectionRegistry;
use crate::ws::protocol::{ControlMessage, Credentials};

/// Outcome of one completed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionVerdict {
    Valid,
    UnknownUser,
    SignedOut,
    TakenOver,
    /// The session store could not be reached.
    Unavailable,
}

/// The single pending check timer of one connection.
#[derive(Default)]
pub struct DebounceSlot {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebounceSlot {
    /// Abort the pending timer, if any. A check that has already started is
    /// not affected.
    pub async fn cancel(&self) {
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
    }
}

pub struct SessionValidator {
    stores: Stores,
    registry: Arc<ConnectionRegistry>,
    delay: Duration,
}

impl SessionValidator {
    pub fn new(stores: Stores, registry: Arc<ConnectionRegistry>, delay: Duration) -> Self {
        Self {
            stores,
            registry,
            delay,
        }
    }

    /// Replace the connection's pending timer with a new one for
    /// `credentials`.
    pub async fn schedule(self: &Arc<Self>, conn_id: &str, slot: &DebounceSlot, credentials: Credentials) {
        let mut pending = slot.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let validator = Arc::clone(self);
        let conn_id = conn_id.to_string();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(validator.delay).await;
            // Detached so aborting the timer can no longer interrupt the check.
            tokio::spawn(async move {
                validator.check(&conn_id, &credentials).await;
            });
        }));
    }

    /// Run one check immediately and notify the affected connections.
    pub async fn check(&self, conn_id: &str, credentials: &Credentials) -> SessionVerdict {
        let username = credentials.username.as_str();

        let user = match self.stores.users.find_by_username(username).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(conn_id, username, error = %e, "Session check failed");
                self.reply(conn_id, ControlMessage::error("An internal error occurred"))
                    .await;
                return SessionVerdict::Unavailable;
            }
        };

        let Some(mut user) = user else {
            tracing::debug!(conn_id, username, "Session check: unknown user");
            self.registry.unbind(conn_id).await;
            self.reply(conn_id, ControlMessage::logout("User not found")).await;
            return SessionVerdict::UnknownUser;
        };

        let stored_token = user.session_token.clone();
        match stored_token.as_deref() {
            None => {
                tracing::debug!(conn_id, username, "Session check: no active session");
                self.registry.unbind(conn_id).await;
                self.reply(conn_id, ControlMessage::logout("Session ended, please log in again"))
                    .await;
                SessionVerdict::SignedOut
            }
            Some(stored) if stored != credentials.session_token => {
                tracing::warn!(conn_id, username, "Session token mismatch, signing out everywhere");
                user.session_token = None;
                if let Err(e) = self.stores.users.save(&user).await {
                    tracing::error!(username, error = %e, "Failed to clear session token");
                }

                self.reply(
                    conn_id,
                    ControlMessage::logout("Session was opened elsewhere, please log in again"),
                )
                .await;
                if let Some(message) = encode(ControlMessage::logout("Signed out on another device")) {
                    self.registry.broadcast_except(username, conn_id, message).await;
                }
                self.registry.unbind(conn_id).await;
                self.registry.unbind_user(username).await;
                SessionVerdict::TakenOver
            }
            Some(_) => {
                self.registry.bind(conn_id, username).await;
                self.reply(conn_id, ControlMessage::valid("Session is valid")).await;
                SessionVerdict::Valid
            }
        }
    }

    async fn reply(&self, conn_id: &str, control: ControlMessage) {
        if let Some(message) = encode(control) {
            self.registry.send_to(conn_id, message).await;
        }
    }
}

fn encode(control: ControlMessage) -> Option<Message> {
    control
        .encode()
        .map_err(|e| tracing::error!(error = %e, "Failed to encode control message"))
        .ok()
}
