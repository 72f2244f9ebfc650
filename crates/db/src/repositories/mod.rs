//! Repository structs, one per table. Every query takes the pool explicitly.

pub mod bookmark_repo;
pub mod history_repo;
pub mod note_repo;
pub mod shortcut_repo;
pub mod tab_repo;
pub mod user_repo;

pub use bookmark_repo::BookmarkRepo;
pub use history_repo::HistoryRepo;
pub use note_repo::NoteRepo;
pub use shortcut_repo::ShortcutRepo;
pub use tab_repo::TabRepo;
pub use user_repo::UserRepo;
