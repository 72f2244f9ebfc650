//! Routes authorized sync actions to their handlers and delivers the result.
//!
//! Handling a frame happens in two steps: [`Dispatcher::execute`] authorizes
//! and performs the store operation, producing a [`Delivery`];
//! [`Dispatcher::deliver`] then pushes it to the right connections.

use std::sync::Arc;

use tabsync_core::error::CoreError;
use tabsync_db::{StoreError, Stores};

use crate::ws::actions;
use crate::ws::manager::ConnectionRegistry;
use crate::ws::protocol::{Action, ClientMessage, ControlMessage, ProtocolError, SyncEvent};

/// Where a handler's event goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Only the requesting connection.
    Reply(SyncEvent),
    /// The requesting connection plus every other connection bound to the
    /// same user.
    Fanout(SyncEvent),
}

/// Why an action produced no event.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ActionResult = Result<Delivery, ActionError>;

impl ActionError {
    /// The envelope sent back to the requesting connection.
    pub fn to_control(&self) -> ControlMessage {
        match self {
            ActionError::Core(CoreError::Unauthorized(_)) => {
                ControlMessage::logout("Session expired, please log in again")
            }
            ActionError::Core(CoreError::NotFound { entity, id }) => {
                ControlMessage::error(format!("{entity} with id {id} not found"))
            }
            ActionError::Core(CoreError::Validation(msg)) => ControlMessage::error(msg.clone()),
            ActionError::Protocol(e) => ControlMessage::error(e.to_string()),
            ActionError::Core(_) | ActionError::Store(_) => {
                ControlMessage::error("An internal error occurred")
            }
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            ActionError::Store(_) | ActionError::Core(CoreError::Internal(_))
        )
    }
}

pub struct Dispatcher {
    stores: Stores,
    registry: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    pub fn new(stores: Stores, registry: Arc<ConnectionRegistry>) -> Self {
        Self { stores, registry }
    }

    /// Execute one inbound frame from `conn_id` and deliver the outcome.
    pub async fn handle(&self, conn_id: &str, message: ClientMessage) {
        let action_name = message.action.clone().unwrap_or_default();
        let username = message.username.clone().unwrap_or_default();

        match self.execute(message).await {
            Ok((owner, delivery)) => self.deliver(conn_id, &owner, delivery).await,
            Err(e) => {
                if e.is_internal() {
                    tracing::error!(conn_id, username = %username, action = %action_name, error = %e, "Sync action failed");
                } else {
                    tracing::debug!(conn_id, username = %username, action = %action_name, error = %e, "Sync action rejected");
                }
                self.send_control(conn_id, e.to_control()).await;
            }
        }
    }

    /// Authorize the frame and run its action. Returns the confirmed owner
    /// together with the event to deliver.
    pub async fn execute(&self, message: ClientMessage) -> Result<(String, Delivery), ActionError> {
        let kind = message.kind()?;
        let credentials = message.credentials().ok_or(ProtocolError::MissingCredentials)?;

        let user = self
            .stores
            .users
            .find_by_username_and_token(&credentials.username, &credentials.session_token)
            .await?
            .ok_or_else(|| CoreError::Unauthorized("Session is no longer valid".into()))?;

        let action = Action::from_parts(kind, message.data)?;
        let delivery = self.run(&user.username, action).await?;
        Ok((user.username, delivery))
    }

    async fn run(&self, username: &str, action: Action) -> ActionResult {
        let stores = &self.stores;
        match action {
            Action::CreateTab(input) => actions::tabs::create(stores, username, input).await,
            Action::CloseTab { id } => actions::tabs::close(stores, username, id).await,
            Action::GroupTab { id, new_group } => {
                actions::tabs::group(stores, username, id, new_group).await
            }
            Action::GetTabs => actions::tabs::restore(stores, username).await,
            Action::AddShortcut(input) => actions::shortcuts::add(stores, username, input).await,
            Action::GetShortcuts => actions::shortcuts::list(stores, username).await,
            Action::DeleteShortcut { id } => actions::shortcuts::delete(stores, username, id).await,
            Action::AddHistory(input) => actions::history::add(stores, username, input).await,
            Action::GetHistory => actions::history::list(stores, username).await,
            Action::DeleteHistory => actions::history::clear(stores, username).await,
            Action::AddBookmark(input) => actions::bookmarks::add(stores, username, input).await,
            Action::UpdateBookmark { id, patch } => {
                actions::bookmarks::update(stores, username, id, patch).await
            }
            Action::DeleteBookmark { id } => actions::bookmarks::delete(stores, username, id).await,
            Action::GetBookmarks => actions::bookmarks::list(stores, username).await,
            Action::AddNote(input) => actions::notes::add(stores, username, input).await,
            Action::UpdateNote { id, patch } => {
                actions::notes::update(stores, username, id, patch).await
            }
            Action::DeleteNote { id } => actions::notes::delete(stores, username, id).await,
            Action::GetNotes => actions::notes::list(stores, username).await,
        }
    }

    /// Push `delivery` to its recipients. The requesting connection receives
    /// a fan-out event exactly once, bound or not.
    pub async fn deliver(&self, conn_id: &str, username: &str, delivery: Delivery) {
        let (event, fanout) = match delivery {
            Delivery::Reply(event) => (event, false),
            Delivery::Fanout(event) => (event, true),
        };

        let message = match event.encode() {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(conn_id, username, error = %e, "Failed to encode sync event");
                self.send_control(conn_id, ControlMessage::error("An internal error occurred"))
                    .await;
                return;
            }
        };

        if fanout {
            let others = self
                .registry
                .broadcast_except(username, conn_id, message.clone())
                .await;
            tracing::debug!(conn_id, username, others, "Fanned out sync event");
        }
        self.registry.send_to(conn_id, message).await;
    }

    async fn send_control(&self, conn_id: &str, control: ControlMessage) {
        match control.encode() {
            Ok(message) => {
                self.registry.send_to(conn_id, message).await;
            }
            Err(e) => tracing::error!(conn_id, error = %e, "Failed to encode control message"),
        }
    }
}
