//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cursus_core::error::CoreError;
use cursus_core::types::DocId;
use cursus_db::repositories::SessionRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer` header.
///
/// The token must be valid and its session (keyed by `jti`) must exist,
/// be unexpired.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: DocId,
    /// Session id of the presented token.
    pub jti: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        if !SessionRepo::is_active(state.store(), &claims.jti).await? {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Session has ended".into(),
            )));
        }

        Ok(AuthUser {
            uid: claims.sub,
            jti: claims.jti,
        })
    }
}
