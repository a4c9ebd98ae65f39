//! Handlers for the `/specialties` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cursus_core::catalog::{CreateSpecialty, Specialty, UpdateSpecialty};
use cursus_core::error::CoreError;
use cursus_core::integrity::DeleteOutcome;
use cursus_core::slug;
use cursus_db::repositories::{ModuleRepo, SpecialtyRepo, YearRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /specialties`.
#[derive(Debug, Deserialize)]
pub struct SpecialtyListParams {
    pub year_id: Option<String>,
}

fn not_found(id: String) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Specialty",
        id,
    })
}

/// Reject references to a year that does not exist.
async fn ensure_year_exists(state: &AppState, year_id: &str) -> AppResult<()> {
    if YearRepo::find_by_id(state.store(), year_id).await?.is_none() {
        return Err(CoreError::invalid("year_id", "Année inconnue.").into());
    }
    Ok(())
}

/// POST /api/v1/specialties
///
/// The document key is the slug of the name; a clash returns 409.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateSpecialty>,
) -> AppResult<(StatusCode, Json<DataResponse<Specialty>>)> {
    let input = input.normalized()?;
    let id = slug::specialty_id(&input.name)?;
    ensure_year_exists(&state, &input.year_id).await?;

    let specialty = SpecialtyRepo::create(state.store(), &id, &input).await?;
    tracing::info!(id = %specialty.id, year_id = %specialty.year_id, "Specialty created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: specialty })))
}

/// GET /api/v1/specialties?year_id=
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<SpecialtyListParams>,
) -> AppResult<Json<DataResponse<Vec<Specialty>>>> {
    let year_id = params.year_id.as_deref().filter(|v| !v.is_empty());
    let specialties = SpecialtyRepo::list(state.store(), year_id).await?;
    Ok(Json(DataResponse { data: specialties }))
}

/// GET /api/v1/specialties/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Specialty>>> {
    let specialty = SpecialtyRepo::find_by_id(state.store(), &id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: specialty }))
}

/// PUT /api/v1/specialties/{id}
///
/// Moving a specialty to another year moves its modules with it.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(input): Json<UpdateSpecialty>,
) -> AppResult<Json<DataResponse<Specialty>>> {
    let input = input.normalized()?;
    if let Some(year_id) = &input.year_id {
        ensure_year_exists(&state, year_id).await?;
    }
    let specialty = SpecialtyRepo::update(state.store(), &id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    if input.year_id.is_some() {
        let moved =
            ModuleRepo::move_to_year(state.store(), &specialty.id, &specialty.year_id).await?;
        if moved > 0 {
            tracing::info!(
                id = %specialty.id,
                year_id = %specialty.year_id,
                moved,
                "Modules moved with their specialty"
            );
        }
    }
    Ok(Json(DataResponse { data: specialty }))
}

/// DELETE /api/v1/specialties/{id}
///
/// Refused while modules reference the specialty.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteOutcome>> {
    let outcome = SpecialtyRepo::delete(state.store(), &id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(outcome))
}
