//! Catalog entities, their create/patch inputs, and input normalization.
//!
//! Inputs are validated with [`crate::validation`] helpers; `normalized`
//! trims text, rejects missing or out-of-range values, and returns the
//! cleaned input ready to persist.

pub mod course_module;
pub mod resource;
pub mod specialty;
pub mod user;
pub mod year;

pub use course_module::{CourseModule, CreateCourseModule, Evaluation, UpdateCourseModule};
pub use resource::{CreateResource, Resource, ResourceKind, UpdateResource};
pub use specialty::{CreateSpecialty, Specialty, UpdateSpecialty};
pub use user::{AdminUserView, CreateUserProfile, UpdateUserProfile, UserProfile};
pub use year::{CreateYear, UpdateYear, Year};

/// Semester labels offered for every academic year.
pub const SEMESTERS: &[&str] = &["Semestre 1", "Semestre 2"];
