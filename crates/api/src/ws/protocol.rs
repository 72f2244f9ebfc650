//! Wire format of the sync channel.
//!
//! Inbound frames are JSON text: `{action, sessionToken, username, data?}`.
//! Outbound frames are either a control envelope (`{status, message}`) or a
//! sync event tagged by its `action` name.

use axum::extract::ws::Message;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabsync_core::types::DbId;
use tabsync_db::models::bookmark::{Bookmark, CreateBookmark, UpdateBookmark};
use tabsync_db::models::history::{CreateHistoryEntry, HistoryEntry};
use tabsync_db::models::note::{CreateNote, Note, UpdateNote};
use tabsync_db::models::shortcut::{CreateShortcut, Shortcut};
use tabsync_db::models::tab::{CreateTab, Tab};

/// Frame-level failures, reported to the sender as an `error` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Message has no action")]
    MissingAction,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Missing sessionToken or username")]
    MissingCredentials,

    #[error("Invalid data for {action:?}: {reason}")]
    InvalidData { action: ActionKind, reason: String },
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// An inbound frame as received. Every field is optional so that absent
/// values can be reported instead of failing the whole parse.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMessage {
    pub action: Option<String>,
    pub session_token: Option<String>,
    pub username: Option<String>,
    pub data: Option<Value>,
}

/// The `(username, sessionToken)` pair claimed by a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub session_token: String,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Both credentials, when present and non-empty.
    pub fn credentials(&self) -> Option<Credentials> {
        let username = self.username.as_deref().filter(|s| !s.is_empty())?;
        let session_token = self.session_token.as_deref().filter(|s| !s.is_empty())?;
        Some(Credentials {
            username: username.to_string(),
            session_token: session_token.to_string(),
        })
    }

    pub fn kind(&self) -> Result<ActionKind, ProtocolError> {
        let name = self.action.as_deref().ok_or(ProtocolError::MissingAction)?;
        ActionKind::parse(name).ok_or_else(|| ProtocolError::UnknownAction(name.to_string()))
    }
}

/// The closed set of inbound actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    CreateTab,
    CloseTab,
    GroupTab,
    GetTabs,
    AddShortcut,
    GetShortcuts,
    DeleteShortcut,
    AddHistory,
    GetHistory,
    DeleteHistory,
    AddBookmark,
    UpdateBookmark,
    DeleteBookmark,
    GetBookmarks,
    AddNote,
    UpdateNote,
    DeleteNote,
    GetNotes,
}

impl ActionKind {
    /// Look up an action by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        serde_json::from_value(Value::String(name.to_string())).ok()
    }
}

#[derive(Debug, Deserialize)]
struct IdData {
    id: DbId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupTabData {
    id: DbId,
    new_group: String,
}

#[derive(Debug, Deserialize)]
struct UpdateData<P> {
    id: DbId,
    #[serde(flatten)]
    patch: P,
}

/// A fully decoded action with its typed payload.
#[derive(Debug, Clone)]
pub enum Action {
    CreateTab(CreateTab),
    CloseTab { id: DbId },
    GroupTab { id: DbId, new_group: String },
    GetTabs,
    AddShortcut(CreateShortcut),
    GetShortcuts,
    DeleteShortcut { id: DbId },
    AddHistory(CreateHistoryEntry),
    GetHistory,
    DeleteHistory,
    AddBookmark(CreateBookmark),
    UpdateBookmark { id: DbId, patch: UpdateBookmark },
    DeleteBookmark { id: DbId },
    GetBookmarks,
    AddNote(CreateNote),
    UpdateNote { id: DbId, patch: UpdateNote },
    DeleteNote { id: DbId },
    GetNotes,
}

impl Action {
    /// Decode the `data` payload for `kind`. Actions without a payload ignore
    /// whatever `data` carries.
    pub fn from_parts(kind: ActionKind, data: Option<Value>) -> Result<Self, ProtocolError> {
        let action = match kind {
            ActionKind::CreateTab => Action::CreateTab(payload(kind, data)?),
            ActionKind::CloseTab => {
                let IdData { id } = payload(kind, data)?;
                Action::CloseTab { id }
            }
            ActionKind::GroupTab => {
                let GroupTabData { id, new_group } = payload(kind, data)?;
                Action::GroupTab { id, new_group }
            }
            ActionKind::GetTabs => Action::GetTabs,
            ActionKind::AddShortcut => Action::AddShortcut(payload(kind, data)?),
            ActionKind::GetShortcuts => Action::GetShortcuts,
            ActionKind::DeleteShortcut => {
                let IdData { id } = payload(kind, data)?;
                Action::DeleteShortcut { id }
            }
            ActionKind::AddHistory => Action::AddHistory(payload(kind, data)?),
            ActionKind::GetHistory => Action::GetHistory,
            ActionKind::DeleteHistory => Action::DeleteHistory,
            ActionKind::AddBookmark => Action::AddBookmark(payload(kind, data)?),
            ActionKind::UpdateBookmark => {
                let UpdateData { id, patch } = payload(kind, data)?;
                Action::UpdateBookmark { id, patch }
            }
            ActionKind::DeleteBookmark => {
                let IdData { id } = payload(kind, data)?;
                Action::DeleteBookmark { id }
            }
            ActionKind::GetBookmarks => Action::GetBookmarks,
            ActionKind::AddNote => Action::AddNote(payload(kind, data)?),
            ActionKind::UpdateNote => {
                let UpdateData { id, patch } = payload(kind, data)?;
                Action::UpdateNote { id, patch }
            }
            ActionKind::DeleteNote => {
                let IdData { id } = payload(kind, data)?;
                Action::DeleteNote { id }
            }
            ActionKind::GetNotes => Action::GetNotes,
        };
        Ok(action)
    }
}

fn payload<T: DeserializeOwned>(kind: ActionKind, data: Option<Value>) -> Result<T, ProtocolError> {
    // A missing payload decodes as `{}` so the error names the missing field.
    let data = data.unwrap_or_else(|| Value::Object(Default::default()));
    serde_json::from_value(data).map_err(|e| ProtocolError::InvalidData {
        action: kind,
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlStatus {
    Valid,
    Logout,
    Error,
}

/// Session verdicts and failures: `{status, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlMessage {
    pub status: ControlStatus,
    pub message: String,
}

impl ControlMessage {
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            status: ControlStatus::Valid,
            message: message.into(),
        }
    }

    pub fn logout(message: impl Into<String>) -> Self {
        Self {
            status: ControlStatus::Logout,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ControlStatus::Error,
            message: message.into(),
        }
    }

    pub fn encode(&self) -> Result<Message, serde_json::Error> {
        encode_json(self)
    }
}

/// Data events: `{action: <event name>, ...payload}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SyncEvent {
    TabCreated { tab: Tab },
    TabClosed { tab_id: DbId },
    TabGrouped { tab: Tab },
    RestoreTabs { tabs: Vec<Tab> },
    ShortcutAdded { shortcut: Shortcut },
    ShortcutsRetrieved { shortcuts: Vec<Shortcut> },
    ShortcutDeleted { shortcut_id: DbId },
    HistoryAdded { entry: HistoryEntry },
    HistoryRetrieved { history: Vec<HistoryEntry> },
    HistoryCleared { deleted: u64 },
    BookmarkAdded { bookmark: Bookmark },
    BookmarkUpdated { bookmark: Bookmark },
    BookmarkDeleted { bookmark_id: DbId },
    BookmarksRetrieved { bookmarks: Vec<Bookmark> },
    NoteAdded { note: Note },
    NoteUpdated { note: Note },
    NoteDeleted { note_id: DbId },
    NotesRetrieved { notes: Vec<Note> },
}

impl SyncEvent {
    pub fn encode(&self) -> Result<Message, serde_json::Error> {
        encode_json(self)
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<Message, serde_json::Error> {
    Ok(Message::Text(serde_json::to_string(value)?.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_frame() {
        let msg = ClientMessage::parse(
            r#"{"action":"getTabs","sessionToken":"t","username":"alice"}"#,
        )
        .unwrap();
        assert_eq!(msg.kind().unwrap(), ActionKind::GetTabs);
        assert_eq!(
            msg.credentials(),
            Some(Credentials {
                username: "alice".into(),
                session_token: "t".into()
            })
        );
    }

    #[test]
    fn unparseable_frame_is_malformed() {
        assert!(matches!(
            ClientMessage::parse("not json"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn empty_credentials_count_as_missing() {
        let msg = ClientMessage::parse(r#"{"action":"getTabs","sessionToken":"","username":"alice"}"#)
            .unwrap();
        assert_eq!(msg.credentials(), None);
    }

    #[test]
    fn unknown_action_reported_by_name() {
        let msg = ClientMessage::parse(r#"{"action":"launchRocket"}"#).unwrap();
        let err = msg.kind().unwrap_err();
        assert_eq!(err.to_string(), "Unknown action: launchRocket");
    }

    #[test]
    fn missing_payload_names_the_field() {
        let err = Action::from_parts(ActionKind::CloseTab, None).unwrap_err();
        assert!(err.to_string().contains("missing field `id`"), "{err}");
    }

    #[test]
    fn group_tab_payload_uses_camel_case() {
        let action =
            Action::from_parts(ActionKind::GroupTab, Some(json!({"id": 7, "newGroup": "work"})))
                .unwrap();
        assert!(matches!(action, Action::GroupTab { id: 7, ref new_group } if new_group == "work"));
    }

    #[test]
    fn update_payload_flattens_patch() {
        let action = Action::from_parts(
            ActionKind::UpdateNote,
            Some(json!({"id": 3, "content": "hello"})),
        )
        .unwrap();
        match action {
            Action::UpdateNote { id, patch } => {
                assert_eq!(id, 3);
                assert_eq!(patch.title, None);
                assert_eq!(patch.content.as_deref(), Some("hello"));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn events_are_tagged_with_camel_case_fields() {
        let value = serde_json::to_value(SyncEvent::TabClosed { tab_id: 4 }).unwrap();
        assert_eq!(value, json!({"action": "tabClosed", "tabId": 4}));

        let value = serde_json::to_value(SyncEvent::HistoryCleared { deleted: 2 }).unwrap();
        assert_eq!(value, json!({"action": "historyCleared", "deleted": 2}));
    }

    #[test]
    fn control_status_is_lowercase() {
        let value = serde_json::to_value(ControlMessage::logout("bye")).unwrap();
        assert_eq!(value, json!({"status": "logout", "message": "bye"}));
    }
}
