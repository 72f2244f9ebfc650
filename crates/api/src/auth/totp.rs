//! Time-based one-time codes for passwordless login.
//!
//! Standard RFC 6238 parameters: SHA1, 6 digits, 30-second period, one step
//! of skew in either direction.

use rand::Rng;
use totp_rs::{Algorithm, Secret, TOTP};

const TOTP_DIGITS: usize = 6;
const TOTP_SKEW: u8 = 1;
const TOTP_STEP_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum TotpError {
    #[error("Stored TOTP secret is not valid base32: {0}")]
    InvalidSecret(String),

    #[error("TOTP creation failed: {0}")]
    Build(String),

    #[error("System clock error: {0}")]
    Clock(#[from] std::time::SystemTimeError),
}

/// Generate a random 20-byte (160-bit) secret, base32-encoded.
pub fn generate_secret() -> String {
    let secret_bytes: [u8; 20] = rand::rng().random();
    Secret::Raw(secret_bytes.to_vec()).to_encoded().to_string()
}

/// Build a TOTP instance from a base32 secret for `account_name`.
pub fn build_totp(secret_base32: &str, issuer: &str, account_name: &str) -> Result<TOTP, TotpError> {
    let secret_bytes = Secret::Encoded(secret_base32.to_string())
        .to_bytes()
        .map_err(|e| TotpError::InvalidSecret(format!("{e:?}")))?;

    TOTP::new(
        Algorithm::SHA1,
        TOTP_DIGITS,
        TOTP_SKEW,
        TOTP_STEP_SECS,
        secret_bytes,
        Some(issuer.to_string()),
        account_name.to_string(),
    )
    .map_err(|e| TotpError::Build(format!("{e:?}")))
}

/// `otpauth://` URI for authenticator apps.
pub fn provisioning_uri(
    secret_base32: &str,
    issuer: &str,
    account_name: &str,
) -> Result<String, TotpError> {
    Ok(build_totp(secret_base32, issuer, account_name)?.get_url())
}

/// Check `code` against the current time window.
pub fn verify_code(
    secret_base32: &str,
    issuer: &str,
    account_name: &str,
    code: &str,
) -> Result<bool, TotpError> {
    let totp = build_totp(secret_base32, issuer, account_name)?;
    Ok(totp.check_current(code.trim())?)
}
