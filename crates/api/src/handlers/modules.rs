//! Handlers for the `/modules` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cursus_core::catalog::{CourseModule, CreateCourseModule, UpdateCourseModule};
use cursus_core::error::CoreError;
use cursus_core::integrity::DeleteOutcome;
use cursus_core::slug;
use cursus_db::repositories::{ModuleFilter, ModuleRepo, SpecialtyRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: String) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Module",
        id,
    })
}

/// POST /api/v1/modules
///
/// The key is `{specialty_id}_{semester token}_{slug of name}`; a clash
/// returns 409. `year_id` must be the year of the specialty.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateCourseModule>,
) -> AppResult<(StatusCode, Json<DataResponse<CourseModule>>)> {
    let input = input.normalized()?;
    let specialty = SpecialtyRepo::find_by_id(state.store(), &input.specialty_id)
        .await?
        .ok_or_else(|| CoreError::invalid("specialty_id", "Spécialité inconnue."))?;
    if specialty.year_id != input.year_id {
        return Err(CoreError::invalid(
            "year_id",
            "L'année ne correspond pas à celle de la spécialité.",
        )
        .into());
    }
    let id = slug::module_id(&input.specialty_id, &input.semester_key, &input.name)?;

    let module = ModuleRepo::create(state.store(), &id, &input).await?;
    tracing::info!(id = %module.id, "Module created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: module })))
}

/// GET /api/v1/modules?specialty_id=&semester_key=&year_id=
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(filter): Query<ModuleFilter>,
) -> AppResult<Json<DataResponse<Vec<CourseModule>>>> {
    let blank_to_none = |v: Option<String>| v.filter(|s| !s.is_empty());
    let filter = ModuleFilter {
        specialty_id: blank_to_none(filter.specialty_id),
        semester_key: blank_to_none(filter.semester_key),
        year_id: blank_to_none(filter.year_id),
    };
    let modules = ModuleRepo::list(state.store(), &filter).await?;
    Ok(Json(DataResponse { data: modules }))
}

/// GET /api/v1/modules/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<CourseModule>>> {
    let module = ModuleRepo::find_by_id(state.store(), &id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: module }))
}

/// PUT /api/v1/modules/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(input): Json<UpdateCourseModule>,
) -> AppResult<Json<DataResponse<CourseModule>>> {
    let input = input.normalized()?;
    let module = ModuleRepo::update(state.store(), &id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: module }))
}

/// DELETE /api/v1/modules/{id}
///
/// Refused while resources reference the module.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteOutcome>> {
    let outcome = ModuleRepo::delete(state.store(), &id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(outcome))
}
