//! Cursus catalog API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! storage and import clients) so integration tests and the binary
//! entrypoint can both access them.

pub mod auth;
pub mod bootstrap;
pub mod completion;
pub mod config;
pub mod error;
pub mod handlers;
pub mod inflight;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod storage;
