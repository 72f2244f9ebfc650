//! Account credentials: TOTP enrollment/verification and session tokens.

pub mod totp;

/// Mint a fresh opaque session token.
pub fn new_session_token() -> String {
    uuid::Uuid::new_v4().to_string()
}
