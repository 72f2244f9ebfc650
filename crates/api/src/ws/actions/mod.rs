//! One module per collection. Each handler receives the owner confirmed by
//! the dispatcher, performs exactly one store operation scoped to that owner
//! and says where the resulting event goes.

pub mod bookmarks;
pub mod history;
pub mod notes;
pub mod shortcuts;
pub mod tabs;
