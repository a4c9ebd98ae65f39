//! Route definitions for the `/resources` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::resources;
use crate::state::AppState;

/// Routes mounted at `/resources`.
///
/// ```text
/// GET    /?module_id=  -> list
/// POST   /             -> create
/// GET    /{id}         -> get_by_id
/// PUT    /{id}         -> update
/// DELETE /{id}         -> delete (also removes the stored file)
/// POST   /{id}/file    -> upload_file (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(resources::list).post(resources::create))
        .route(
            "/{id}",
            get(resources::get_by_id)
                .put(resources::update)
                .delete(resources::delete),
        )
        .route("/{id}/file", post(resources::upload_file))
}
