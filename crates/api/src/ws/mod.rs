//! The sync channel: one WebSocket per browser session.
//!
//! Provides the connection registry, the debounced session validator, the
//! action dispatcher and the HTTP upgrade handler used by Axum routes.

pub mod actions;
pub mod dispatcher;
mod handler;
pub mod heartbeat;
pub mod manager;
pub mod protocol;
pub mod session;

pub use dispatcher::Dispatcher;
pub use handler::ws_handler;
pub use heartbeat::run_heartbeat;
pub use manager::ConnectionRegistry;
pub use session::SessionValidator;
