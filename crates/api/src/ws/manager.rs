use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tabsync_core::types::Timestamp;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Set once the session validator has accepted the connection's
    /// credentials; cleared on logout.
    pub username: Option<String>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Tracks every open sync connection and which user, if any, it is bound to.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application. Fan-out methods copy the matching senders
/// out of the map before sending, so a slow or closed connection never holds
/// the lock.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl ConnectionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new, unbound connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn register(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            username: None,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn unregister(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.remove(conn_id) {
            let open_secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
            tracing::debug!(conn_id, open_secs, "Connection unregistered");
        }
    }

    /// Bind a connection to `username`. Returns `false` if the connection is
    /// no longer registered.
    pub async fn bind(&self, conn_id: &str, username: &str) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.username = Some(username.to_string());
                true
            }
            None => false,
        }
    }

    /// Detach a connection from its user. The connection stays registered
    /// and stops receiving that user's fan-out events.
    pub async fn unbind(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.get_mut(conn_id) {
            conn.username = None;
        }
    }

    /// Unbind every connection of `username`. Returns how many were bound.
    pub async fn unbind_user(&self, username: &str) -> usize {
        let mut conns = self.connections.write().await;
        let mut count = 0;
        for conn in conns.values_mut() {
            if conn.username.as_deref() == Some(username) {
                conn.username = None;
                count += 1;
            }
        }
        count
    }

    /// The user a connection is currently bound to.
    pub async fn username_of(&self, conn_id: &str) -> Option<String> {
        self.connections
            .read()
            .await
            .get(conn_id)
            .and_then(|conn| conn.username.clone())
    }

    /// Find all connection IDs bound to a given user.
    pub async fn get_by_user(&self, username: &str) -> Vec<String> {
        self.connections
            .read()
            .await
            .iter()
            .filter_map(|(id, conn)| {
                if conn.username.as_deref() == Some(username) {
                    Some(id.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Send a message to one connection. Returns `false` if the connection is
    /// gone or its channel is closed.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        let sender = match self.connections.read().await.get(conn_id) {
            Some(conn) => conn.sender.clone(),
            None => {
                tracing::debug!(conn_id, "Reply dropped, connection is gone");
                return false;
            }
        };
        if sender.send(message).is_err() {
            tracing::debug!(conn_id, "Reply dropped, connection channel closed");
            return false;
        }
        true
    }

    /// Send a message to every connection bound to `username`.
    ///
    /// Returns the number of connections the message was delivered to.
    pub async fn broadcast(&self, username: &str, message: Message) -> usize {
        self.fan_out(username, None, message).await
    }

    /// Like [`broadcast`](Self::broadcast) but skips `skip_conn_id`.
    pub async fn broadcast_except(
        &self,
        username: &str,
        skip_conn_id: &str,
        message: Message,
    ) -> usize {
        self.fan_out(username, Some(skip_conn_id), message).await
    }

    async fn fan_out(&self, username: &str, skip: Option<&str>, message: Message) -> usize {
        let targets: Vec<(String, WsSender)> = self
            .connections
            .read()
            .await
            .iter()
            .filter(|(id, conn)| {
                conn.username.as_deref() == Some(username) && Some(id.as_str()) != skip
            })
            .map(|(id, conn)| (id.clone(), conn.sender.clone()))
            .collect();

        let mut delivered = 0;
        for (conn_id, sender) in targets {
            if sender.is_closed() {
                continue;
            }
            match sender.send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::debug!(conn_id = %conn_id, username, "Broadcast skipped closed connection");
                }
            }
        }
        delivered
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Queue a Ping frame on every connection. Returns how many channels
    /// were still open.
    pub async fn ping_all(&self) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.sender.send(Message::Ping(Bytes::new())).is_ok())
            .count()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
