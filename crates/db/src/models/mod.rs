//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row (serialized to
//!   clients in camelCase, except [`user::User`] which never leaves the server)
//! - A `Deserialize` + `Validate` create DTO
//! - An update DTO (all `Option` fields) where the record is mutable

pub mod bookmark;
pub mod history;
pub mod note;
pub mod shortcut;
pub mod tab;
pub mod user;
