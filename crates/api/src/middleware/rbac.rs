//! Admin access extractor.
//!
//! Console access is granted by a document in the `admins` collection
//! keyed by the user's uid. The check runs on every request, so revoking
//! the marker takes effect immediately.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cursus_core::error::CoreError;
use cursus_db::repositories::AdminRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires an admin marker. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !AdminRepo::is_admin(state.store(), &user.uid).await? {
            tracing::debug!(uid = %user.uid, "Admin access denied");
            return Err(AppError::Core(CoreError::Forbidden(
                "Accès réservé aux administrateurs.".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
