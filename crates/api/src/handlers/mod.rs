//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers re-validate input with the `cursus_core` normalizers, delegate
//! to the repositories in `cursus_db`, and map errors via
//! [`crate::error::AppError`].

pub mod auth;
pub mod health;
pub mod modules;
pub mod resources;
pub mod specialties;
pub mod users;
pub mod years;
