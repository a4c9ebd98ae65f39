//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                     -> list
/// POST   /                     -> create
/// GET    /{uid}                -> get_by_id
/// PUT    /{uid}                -> update
/// DELETE /{uid}                -> delete
/// POST   /{uid}/admin/toggle   -> toggle_admin
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route(
            "/{uid}",
            get(users::get_by_id)
                .put(users::update)
                .delete(users::delete),
        )
        .route("/{uid}/admin/toggle", post(users::toggle_admin))
}
