use std::sync::Arc;
use std::time::Duration;

use tabsync_db::Stores;

use crate::config::ServerConfig;
use crate::ws::{ConnectionRegistry, Dispatcher, SessionValidator};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Session store and the five resource collections.
    pub stores: Stores,
    pub config: Arc<ServerConfig>,
    /// Live WebSocket connections, shared by the validator and dispatcher.
    pub registry: Arc<ConnectionRegistry>,
    pub validator: Arc<SessionValidator>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Wire the sync channel components around one registry.
    pub fn new(stores: Stores, config: ServerConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let validator = Arc::new(SessionValidator::new(
            stores.clone(),
            Arc::clone(&registry),
            Duration::from_millis(config.session_check_delay_ms),
        ));
        let dispatcher = Arc::new(Dispatcher::new(stores.clone(), Arc::clone(&registry)));

        Self {
            stores,
            config: Arc::new(config),
            registry,
            validator,
            dispatcher,
        }
    }
}
