//! Route definitions for the `/modules` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{modules, resources};
use crate::state::AppState;

/// Routes mounted at `/modules`.
///
/// ```text
/// GET    /                        -> list (specialty_id, semester_key, year_id filters)
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete (refused while resources reference it)
/// POST   /{id}/resources/import   -> resources::import
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(modules::list).post(modules::create))
        .route(
            "/{id}",
            get(modules::get_by_id)
                .put(modules::update)
                .delete(modules::delete),
        )
        .route("/{id}/resources/import", post(resources::import))
}
