//! Account lifecycle constants and validation (registration, OTP login, bans).

use crate::types::Timestamp;

/// Freshly registered, OTP never confirmed. Swept after the retention window.
pub const USER_STATUS_INIT: &str = "init";
/// At least one successful OTP login.
pub const USER_STATUS_VERIFIED: &str = "verified";

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Validate a username: 3 to 32 characters of ASCII letters, digits, `_`, `.`
/// or `-`.
///
/// The username doubles as the TOTP account label, so `:` is never allowed.
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(
            "Username may only contain letters, digits, '_', '.' and '-'".to_string(),
        );
    }
    Ok(())
}

pub const MAX_EMAIL_LENGTH: usize = 254;

/// Minimal shape check for an email address: `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return Err(format!(
            "Email must be between 1 and {MAX_EMAIL_LENGTH} characters"
        ));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(format!("Invalid email address: {email}"));
    }
    Ok(())
}

/// Whether a ban with the given expiry is still in force at `now`.
pub fn is_ban_active(ban_expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    ban_expires_at.is_some_and(|expires| expires > now)
}
