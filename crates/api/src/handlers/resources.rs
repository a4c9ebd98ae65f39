//! Handlers for the `/resources` resource, file uploads, and bulk import.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cursus_core::catalog::{CreateResource, Resource, UpdateResource};
use cursus_core::error::CoreError;
use cursus_core::import::RejectedItem;
use cursus_core::integrity::DeleteOutcome;
use cursus_db::repositories::{ModuleRepo, ResourceRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::resource_file_path;

/// Longest free text accepted for one import request.
const MAX_IMPORT_TEXT_CHARS: usize = 50_000;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /resources`.
#[derive(Debug, Deserialize)]
pub struct ResourceListParams {
    pub module_id: Option<String>,
}

/// Request body for `POST /modules/{id}/resources/import`.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub text: String,
}

/// Result of a bulk import: created resources and the items refused.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub created: Vec<Resource>,
    pub rejected: Vec<RejectedItem>,
}

fn not_found(id: String) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Resource",
        id,
    })
}

async fn ensure_module_exists(state: &AppState, module_id: &str) -> AppResult<()> {
    if ModuleRepo::find_by_id(state.store(), module_id)
        .await?
        .is_none()
    {
        return Err(CoreError::invalid("module_id", "Module inconnu.").into());
    }
    Ok(())
}

/// Remove a stored file, logging instead of failing.
async fn release_file(state: &AppState, path: &str) {
    if let Err(e) = state.files.delete(path).await {
        tracing::warn!(path, error = %e, "Failed to remove stored file");
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/resources
///
/// A missing URL creates the resource pending a file upload.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateResource>,
) -> AppResult<(StatusCode, Json<DataResponse<Resource>>)> {
    let input = input.normalized()?;
    ensure_module_exists(&state, &input.module_id).await?;
    let resource = ResourceRepo::create(state.store(), &input).await?;
    tracing::info!(id = %resource.id, module_id = %resource.module_id, "Resource created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: resource })))
}

/// GET /api/v1/resources?module_id=
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ResourceListParams>,
) -> AppResult<Json<DataResponse<Vec<Resource>>>> {
    let module_id = params.module_id.as_deref().filter(|v| !v.is_empty());
    let resources = ResourceRepo::list(state.store(), module_id).await?;
    Ok(Json(DataResponse { data: resources }))
}

/// GET /api/v1/resources/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Resource>>> {
    let resource = ResourceRepo::find_by_id(state.store(), &id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: resource }))
}

/// PUT /api/v1/resources/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(input): Json<UpdateResource>,
) -> AppResult<Json<DataResponse<Resource>>> {
    let input = input.normalized()?;
    let resource = ResourceRepo::update(state.store(), &id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: resource }))
}

/// DELETE /api/v1/resources/{id}
///
/// Also removes the uploaded file, if any.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteOutcome>> {
    let removed = ResourceRepo::delete(state.store(), &id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if let Some(path) = &removed.storage_path {
        release_file(&state, path).await;
    }
    Ok(Json(DeleteOutcome::deleted()))
}

// ---------------------------------------------------------------------------
// File upload
// ---------------------------------------------------------------------------

/// POST /api/v1/resources/{id}/file
///
/// Accepts `multipart/form-data` with a `file` field. Stores the file at
/// `resources/{id}/{sanitized name}` and points the resource's URL at it,
/// replacing any previous upload.
pub async fn upload_file(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<Resource>>> {
    let existing = ResourceRepo::find_by_id(state.store(), &id)
        .await?
        .ok_or_else(|| not_found(id.clone()))?;

    let mut file_data: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("fichier").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file_data = Some((filename, data.to_vec()));
    }

    let (filename, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if data.is_empty() {
        return Err(CoreError::invalid("file", "Le fichier est vide.").into());
    }
    if data.len() > state.config.max_upload_bytes {
        return Err(CoreError::invalid(
            "file",
            format!(
                "Le fichier dépasse la taille maximale de {} octets.",
                state.config.max_upload_bytes
            ),
        )
        .into());
    }

    let path = resource_file_path(&id, &filename);
    let stored = state.files.put(&path, &data).await?;

    let resource = match ResourceRepo::set_file(state.store(), &id, &stored.url, &stored.path).await
    {
        Ok(Some(resource)) => resource,
        outcome => {
            if existing.storage_path.as_deref() != Some(stored.path.as_str()) {
                release_file(&state, &stored.path).await;
            }
            return Err(match outcome {
                Err(e) => e.into(),
                Ok(_) => not_found(id),
            });
        }
    };

    if let Some(previous) = existing.storage_path.as_deref().filter(|p| *p != stored.path) {
        release_file(&state, previous).await;
    }
    tracing::info!(id = %resource.id, path = %stored.path, size = data.len(), "Resource file uploaded");
    Ok(Json(DataResponse { data: resource }))
}

// ---------------------------------------------------------------------------
// Bulk import
// ---------------------------------------------------------------------------

/// POST /api/v1/modules/{id}/resources/import
///
/// Sends the free text to the completion API, validates the returned
/// items, and creates the valid ones under the module.
pub async fn import(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(module_id): Path<String>,
    Json(input): Json<ImportRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ImportResponse>>)> {
    let extractor = state.extractor.clone().ok_or_else(|| {
        AppError::BadRequest("L'import automatique n'est pas configuré.".into())
    })?;

    let text = input.text.trim();
    if text.is_empty() {
        return Err(CoreError::invalid("text", "Le texte à analyser est vide.").into());
    }
    if text.chars().count() > MAX_IMPORT_TEXT_CHARS {
        return Err(CoreError::invalid(
            "text",
            format!("Le texte dépasse {MAX_IMPORT_TEXT_CHARS} caractères."),
        )
        .into());
    }
    if ModuleRepo::find_by_id(state.store(), &module_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id: module_id,
        }));
    }

    let batch = extractor.extract(text).await?;
    let inputs: Vec<CreateResource> = batch
        .accepted
        .into_iter()
        .map(|item| item.into_create(module_id.clone()))
        .collect();
    let created = ResourceRepo::create_many(state.store(), &inputs).await?;

    tracing::info!(
        module_id = %module_id,
        created = created.len(),
        rejected = batch.rejected.len(),
        "Resources imported"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ImportResponse {
                created,
                rejected: batch.rejected,
            },
        }),
    ))
}
