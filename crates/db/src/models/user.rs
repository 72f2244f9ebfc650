//! User entity model and DTOs.

use sqlx::FromRow;
use tabsync_core::account::USER_STATUS_VERIFIED;
use tabsync_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the TOTP secret and the live session token -- NEVER serialize
/// this to clients.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    /// Base32-encoded TOTP secret.
    pub totp_secret: String,
    /// `init` until the first successful OTP login, then `verified`.
    pub user_status: String,
    /// The single currently valid session credential.
    pub session_token: Option<String>,
    pub ban_ip: Option<String>,
    pub ban_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn is_verified(&self) -> bool {
        self.user_status == USER_STATUS_VERIFIED
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub totp_secret: String,
}
