//! Handlers for the `/auth` resource (register, login, logout, account removal).
//!
//! Login is passwordless: the user proves possession of the TOTP secret handed
//! out at registration. A successful login replaces the single session token,
//! which is what the WebSocket session validator later checks against.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabsync_core::account::{is_ban_active, validate_email, validate_username, USER_STATUS_VERIFIED};
use tabsync_core::error::CoreError;
use tabsync_db::models::user::{CreateUser, User};

use crate::auth::{new_session_token, totp};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::protocol::ControlMessage;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
}

/// Returned once at registration; the secret is never shown again.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub username: String,
    /// Base32-encoded TOTP secret for manual entry.
    pub secret: String,
    /// otpauth:// URI for authenticator apps.
    pub otpauth_uri: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    /// 6-digit code from the authenticator app.
    pub otp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub username: String,
    pub session_token: String,
}

/// Request body for `POST /auth/logout` and `DELETE /auth/account`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub username: String,
    pub session_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an `init` account and return its TOTP secret. The account becomes
/// `verified` on its first successful login.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let username = input.username.trim().to_string();
    let email = input.email.trim().to_lowercase();
    validate_username(&username).map_err(CoreError::Validation)?;
    validate_email(&email).map_err(CoreError::Validation)?;

    if state.stores.users.find_by_username(&username).await?.is_some() {
        return Err(CoreError::Conflict(format!("Username '{username}' is already taken")).into());
    }
    if state.stores.users.find_by_email(&email).await?.is_some() {
        return Err(CoreError::Conflict("Email is already registered".into()).into());
    }

    let secret = totp::generate_secret();
    let otpauth_uri = totp::provisioning_uri(&secret, &state.config.totp_issuer, &username)
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    // The store enforces uniqueness too, covering concurrent registrations.
    let user = state
        .stores
        .users
        .create_user(&CreateUser {
            username,
            email,
            totp_secret: secret.clone(),
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            username: user.username,
            secret,
            otpauth_uri,
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Verify a one-time code and issue a new session token. Any session token
/// previously held by this user stops being valid.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid username or code".into()));

    let mut user = state
        .stores
        .users
        .find_by_username(input.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if is_ban_active(user.ban_expires_at, Utc::now()) {
        tracing::warn!(username = %user.username, "Login attempt while banned");
        return Err(CoreError::Forbidden("Account is temporarily banned".into()).into());
    }

    let valid = totp::verify_code(
        &user.totp_secret,
        &state.config.totp_issuer,
        &user.username,
        &input.otp,
    )
    .map_err(|e| AppError::InternalError(e.to_string()))?;
    if !valid {
        tracing::debug!(username = %user.username, "Rejected one-time code");
        return Err(invalid());
    }

    let token = new_session_token();
    user.user_status = USER_STATUS_VERIFIED.to_string();
    user.session_token = Some(token.clone());
    state.stores.users.save(&user).await?;

    tracing::info!(username = %user.username, "User logged in");

    Ok(Json(LoginResponse {
        username: user.username,
        session_token: token,
    }))
}

/// POST /api/v1/auth/logout
///
/// Clear the session token and sign out every live connection of the user.
pub async fn logout(
    State(state): State<AppState>,
    Json(input): Json<SessionRequest>,
) -> AppResult<StatusCode> {
    let mut user = authenticate(&state, &input).await?;

    user.session_token = None;
    state.stores.users.save(&user).await?;
    sign_out_connections(&state, &user.username, "Signed out").await;

    tracing::info!(username = %user.username, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/auth/account
///
/// Remove the account together with every tab, shortcut, history entry,
/// bookmark and note it owns. The session is revoked before anything is
/// deleted, so live connections are refused from that point on.
pub async fn delete_account(
    State(state): State<AppState>,
    Json(input): Json<SessionRequest>,
) -> AppResult<StatusCode> {
    let mut user = authenticate(&state, &input).await?;

    user.session_token = None;
    state.stores.users.save(&user).await?;
    sign_out_connections(&state, &user.username, "Account deleted").await;

    state.stores.delete_account(&user.username).await?;

    tracing::info!(username = %user.username, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn authenticate(state: &AppState, input: &SessionRequest) -> AppResult<User> {
    state
        .stores
        .users
        .find_by_username_and_token(&input.username, &input.session_token)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid session".into())))
}

async fn sign_out_connections(state: &AppState, username: &str, reason: &str) {
    match ControlMessage::logout(reason).encode() {
        Ok(message) => {
            state.registry.broadcast(username, message).await;
        }
        Err(e) => tracing::error!(error = %e, "Failed to encode logout message"),
    }
    state.registry.unbind_user(username).await;
}
