//! Route definitions for the `/years` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::years;
use crate::state::AppState;

/// Routes mounted at `/years`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete (refused while specialties reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(years::list).post(years::create))
        .route(
            "/{id}",
            get(years::get_by_id)
                .put(years::update)
                .delete(years::delete),
        )
}
