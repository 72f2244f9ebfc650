//! Shared domain types, errors and validation rules for tabsync.

pub mod account;
pub mod error;
pub mod sync;
pub mod types;
