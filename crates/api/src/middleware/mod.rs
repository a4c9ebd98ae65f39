//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the signed-in user, from a Bearer token whose
//!   session is still active.
//! - [`rbac::RequireAdmin`] -- requires an admin marker for that user.

pub mod auth;
pub mod rbac;
