//! Route definitions for the `/specialties` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::specialties;
use crate::state::AppState;

/// Routes mounted at `/specialties`.
///
/// ```text
/// GET    /?year_id=  -> list
/// POST   /           -> create
/// GET    /{id}       -> get_by_id
/// PUT    /{id}       -> update
/// DELETE /{id}       -> delete (refused while modules reference it)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(specialties::list).post(specialties::create))
        .route(
            "/{id}",
            get(specialties::get_by_id)
                .put(specialties::update)
                .delete(specialties::delete),
        )
}
