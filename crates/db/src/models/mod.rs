//! Identity documents stored alongside the catalog.
//!
//! Catalog entities themselves are defined in `cursus_core::catalog` so the
//! console can share them without a database dependency.

pub mod credential;
pub mod session;
