//! Handlers for the `/auth` resource (login, logout, current user).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use cursus_core::error::CoreError;
use cursus_core::session::SessionUser;
use cursus_db::models::session::CreateSession;
use cursus_db::repositories::{AdminRepo, CredentialRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

const INVALID_CREDENTIALS: &str = "Email ou mot de passe incorrect.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: SessionUser,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Non-admins can log in; the console
/// decides what they may see from `user.is_admin`.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = input.email.trim().to_lowercase();

    // 1. Find the credential by email.
    let credential = CredentialRepo::find_by_email(state.store(), &email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    // 2. Check if the account is temporarily locked.
    let now = Utc::now();
    if credential.is_locked(now) {
        return Err(AppError::Core(CoreError::Locked(
            "Compte temporairement verrouillé. Réessayez plus tard.".into(),
        )));
    }
    // An expired lock starts a fresh count.
    let previous_failures = if credential.locked_until.is_some() {
        0
    } else {
        credential.failed_login_count
    };

    // 3. Verify password.
    let password_valid = verify_password(&input.password, &credential.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 4. On failure: increment counter, lock once the threshold is reached.
        let new_count = previous_failures + 1;
        let lock_until = (new_count >= MAX_FAILED_ATTEMPTS)
            .then(|| now + chrono::Duration::minutes(LOCK_DURATION_MINS));
        CredentialRepo::record_failed_login(state.store(), &credential.uid, new_count, lock_until)
            .await?;
        if lock_until.is_some() {
            tracing::warn!(uid = %credential.uid, attempts = new_count, "Account locked after failed logins");
        }
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    // 5. On success: reset failed count, set last_login_at.
    CredentialRepo::record_successful_login(state.store(), &credential.uid).await?;

    // 6. Resolve the session identity.
    let user = session_user(&state, &credential.uid, &credential.email).await?;

    // 7. Sweep this user's expired sessions, then persist the new one.
    let swept = SessionRepo::delete_expired(state.store(), Some(&user.uid), now).await?;
    if swept > 0 {
        tracing::debug!(uid = %user.uid, swept, "Expired sessions removed");
    }
    let (access_token, claims) = generate_access_token(&user.uid, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
        .ok_or_else(|| AppError::InternalError("Token expiry out of range".into()))?;
    SessionRepo::create(
        state.store(),
        &CreateSession {
            jti: claims.jti,
            uid: user.uid.clone(),
            expires_at,
        },
    )
    .await?;

    tracing::info!(uid = %user.uid, is_admin = user.is_admin, "User logged in");
    Ok(Json(AuthResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user,
    }))
}

/// POST /api/v1/auth/logout
///
/// End all sessions of the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let ended = SessionRepo::delete_all_for_user(state.store(), &auth_user.uid).await?;
    tracing::info!(uid = %auth_user.uid, ended, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Json<SessionUser>> {
    let email = CredentialRepo::find_by_uid(state.store(), &auth_user.uid)
        .await?
        .map(|c| c.email)
        .unwrap_or_default();
    Ok(Json(session_user(&state, &auth_user.uid, &email).await?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the session identity from the profile, falling back to the login
/// email when no profile exists.
async fn session_user(state: &AppState, uid: &str, email: &str) -> AppResult<SessionUser> {
    let profile = UserRepo::find_by_id(state.store(), uid).await?;
    let is_admin = AdminRepo::is_admin(state.store(), uid).await?;
    Ok(match profile {
        Some(profile) => SessionUser {
            uid: profile.uid,
            email: profile.email,
            full_name: profile.full_name,
            is_admin,
        },
        None => SessionUser {
            uid: uid.to_string(),
            email: email.to_string(),
            full_name: email.to_string(),
            is_admin,
        },
    })
}
