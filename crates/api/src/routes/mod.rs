pub mod auth;
pub mod health;
pub mod modules;
pub mod resources;
pub mod specialties;
pub mod users;
pub mod years;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user (requires auth)
///
/// /years                                           list, create (admin only)
/// /years/{id}                                      get, update, delete
///
/// /specialties?year_id=                            list, create (admin only)
/// /specialties/{id}                                get, update, delete
///
/// /modules?specialty_id=&semester_key=&year_id=    list, create (admin only)
/// /modules/{id}                                    get, update, delete
/// /modules/{id}/resources/import                   bulk import (POST)
///
/// /resources?module_id=                            list, create (admin only)
/// /resources/{id}                                  get, update, delete
/// /resources/{id}/file                             multipart upload (POST)
///
/// /users                                           list, create (admin only)
/// /users/{uid}                                     get, update, delete
/// /users/{uid}/admin/toggle                        grant or revoke admin (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/years", years::router())
        .nest("/specialties", specialties::router())
        .nest("/modules", modules::router())
        .nest("/resources", resources::router())
        .nest("/users", users::router())
}
