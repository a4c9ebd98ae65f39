//! Handlers for the `/users` resource (student roster and admin markers).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cursus_core::catalog::{AdminUserView, CreateUserProfile, UpdateUserProfile, UserProfile};
use cursus_core::error::CoreError;
use cursus_core::integrity::DeleteOutcome;
use cursus_db::models::credential::CreateCredential;
use cursus_db::repositories::{AdminRepo, CredentialRepo, SessionRepo, UserRepo};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(uid: String) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "User",
        id: uid,
    })
}

async fn ensure_email_free(state: &AppState, email: &str, except: Option<&str>) -> AppResult<()> {
    let taken = CredentialRepo::find_by_email(state.store(), email)
        .await?
        .is_some_and(|c| Some(c.uid.as_str()) != except);
    if taken {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "L'adresse « {email} » est déjà utilisée."
        ))));
    }
    Ok(())
}

async fn admin_view(state: &AppState, profile: UserProfile) -> AppResult<AdminUserView> {
    let is_admin = AdminRepo::is_admin(state.store(), &profile.uid).await?;
    Ok(AdminUserView { profile, is_admin })
}

/// POST /api/v1/users
///
/// Creates the login credential and the profile under a fresh uid.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateUserProfile>,
) -> AppResult<(StatusCode, Json<DataResponse<AdminUserView>>)> {
    let input = input.normalized()?;
    ensure_email_free(&state, &input.email, None).await?;

    let uid = uuid::Uuid::new_v4().to_string();
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    CredentialRepo::create(
        state.store(),
        &CreateCredential {
            uid: uid.clone(),
            email: input.email.clone(),
            password_hash,
        },
    )
    .await?;
    let profile = match UserRepo::create(state.store(), &uid, &input).await {
        Ok(profile) => profile,
        Err(e) => {
            if let Err(cleanup) = CredentialRepo::delete(state.store(), &uid).await {
                tracing::warn!(uid = %uid, error = %cleanup, "Failed to remove orphan credential");
            }
            return Err(e.into());
        }
    };

    tracing::info!(uid = %uid, "User created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AdminUserView {
                profile,
                is_admin: false,
            },
        }),
    ))
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<AdminUserView>>>> {
    let admins = AdminRepo::list_uids(state.store()).await?;
    let users = UserRepo::list(state.store())
        .await?
        .into_iter()
        .map(|profile| {
            let is_admin = admins.contains(&profile.uid);
            AdminUserView { profile, is_admin }
        })
        .collect();
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/users/{uid}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(uid): Path<String>,
) -> AppResult<Json<DataResponse<AdminUserView>>> {
    let profile = UserRepo::find_by_id(state.store(), &uid)
        .await?
        .ok_or_else(|| not_found(uid))?;
    Ok(Json(DataResponse {
        data: admin_view(&state, profile).await?,
    }))
}

/// PUT /api/v1/users/{uid}
///
/// Blank matricule, year or speciality clear the stored value. A new email
/// is also applied to the login credential.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(uid): Path<String>,
    Json(input): Json<UpdateUserProfile>,
) -> AppResult<Json<DataResponse<AdminUserView>>> {
    let input = input.normalized()?;
    if let Some(email) = &input.email {
        ensure_email_free(&state, email, Some(&uid)).await?;
    }

    let profile = UserRepo::update(state.store(), &uid, &input)
        .await?
        .ok_or_else(|| not_found(uid.clone()))?;
    if let Some(email) = &input.email {
        CredentialRepo::update_email(state.store(), &uid, email).await?;
    }

    Ok(Json(DataResponse {
        data: admin_view(&state, profile).await?,
    }))
}

/// DELETE /api/v1/users/{uid}
///
/// Removes the profile, credential, admin marker and sessions.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(uid): Path<String>,
) -> AppResult<Json<DeleteOutcome>> {
    if admin.uid == uid {
        return Err(AppError::Core(CoreError::Forbidden(
            "Vous ne pouvez pas supprimer votre propre compte.".into(),
        )));
    }
    if !UserRepo::delete(state.store(), &uid).await? {
        return Err(not_found(uid));
    }
    CredentialRepo::delete(state.store(), &uid).await?;
    AdminRepo::revoke(state.store(), &uid).await?;
    let sessions = SessionRepo::delete_all_for_user(state.store(), &uid).await?;

    tracing::info!(uid = %uid, sessions, deleted_by = %admin.uid, "User deleted");
    Ok(Json(DeleteOutcome::deleted()))
}

/// POST /api/v1/users/{uid}/admin/toggle
///
/// Grants the admin marker if absent, revokes it if present. A second
/// toggle for the same user while one is running is refused with 409.
pub async fn toggle_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(uid): Path<String>,
) -> AppResult<Json<DataResponse<AdminUserView>>> {
    let _guard = state.admin_toggles.try_claim(&uid).ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Une modification des droits de cet utilisateur est déjà en cours.".into(),
        ))
    })?;

    let profile = UserRepo::find_by_id(state.store(), &uid)
        .await?
        .ok_or_else(|| not_found(uid.clone()))?;

    let is_admin = if AdminRepo::is_admin(state.store(), &uid).await? {
        if admin.uid == uid {
            return Err(AppError::Core(CoreError::Forbidden(
                "Vous ne pouvez pas retirer vos propres droits d'administrateur.".into(),
            )));
        }
        AdminRepo::revoke(state.store(), &uid).await?;
        false
    } else {
        AdminRepo::grant(state.store(), &uid, Some(&admin.uid)).await?;
        true
    };

    tracing::info!(uid = %uid, is_admin, changed_by = %admin.uid, "Admin marker toggled");
    Ok(Json(DataResponse {
        data: AdminUserView { profile, is_admin },
    }))
}
