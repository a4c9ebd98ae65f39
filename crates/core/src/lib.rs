//! Domain core for the course-catalog administration service.
//!
//! Pure logic shared by the HTTP service and the headless console: entity
//! types and their validation, deterministic document keys, delete
//! outcomes, the cascading selection and session state machines, local
//! search, and bulk-import payload validation. Nothing in here performs I/O.

pub mod catalog;
pub mod error;
pub mod import;
pub mod integrity;
pub mod search;
pub mod selection;
pub mod session;
pub mod slug;
pub mod types;
pub mod validation;
