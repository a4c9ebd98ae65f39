//! Handlers for the `/years` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cursus_core::catalog::{CreateYear, UpdateYear, Year};
use cursus_core::error::CoreError;
use cursus_core::integrity::DeleteOutcome;
use cursus_db::repositories::YearRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: String) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Year", id })
}

/// POST /api/v1/years
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateYear>,
) -> AppResult<(StatusCode, Json<DataResponse<Year>>)> {
    let input = input.normalized()?;
    let year = YearRepo::create(state.store(), &input).await?;
    tracing::info!(id = %year.id, name = %year.name, "Year created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: year })))
}

/// GET /api/v1/years
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Year>>>> {
    let years = YearRepo::list(state.store()).await?;
    Ok(Json(DataResponse { data: years }))
}

/// GET /api/v1/years/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Year>>> {
    let year = YearRepo::find_by_id(state.store(), &id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: year }))
}

/// PUT /api/v1/years/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(input): Json<UpdateYear>,
) -> AppResult<Json<DataResponse<Year>>> {
    let input = input.normalized()?;
    let year = YearRepo::update(state.store(), &id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: year }))
}

/// DELETE /api/v1/years/{id}
///
/// Refused (200 with `success: false`) while specialties reference the year.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteOutcome>> {
    let outcome = YearRepo::delete(state.store(), &id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(outcome))
}
