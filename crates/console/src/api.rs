//! The catalog service as seen by the console.

use async_trait::async_trait;
use cursus_core::catalog::{
    AdminUserView, CourseModule, CreateCourseModule, CreateResource, CreateSpecialty,
    CreateUserProfile, CreateYear, Resource, Specialty, UpdateCourseModule, UpdateResource,
    UpdateSpecialty, UpdateUserProfile, UpdateYear, Year,
};
use cursus_core::import::RejectedItem;
use cursus_core::integrity::DeleteOutcome;
use cursus_core::session::SessionUser;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Filters for listing modules. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_id: Option<String>,
}

/// A file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Result of a bulk import.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportOutcome {
    pub created: Vec<Resource>,
    pub rejected: Vec<RejectedItem>,
}

/// Every catalog-service call the console makes.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    // -- session --
    async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    /// The signed-in user, or `None` without a valid session.
    async fn current_user(&self) -> Result<Option<SessionUser>, ApiError>;

    // -- years --
    async fn list_years(&self) -> Result<Vec<Year>, ApiError>;
    async fn create_year(&self, input: &CreateYear) -> Result<Year, ApiError>;
    async fn update_year(&self, id: &str, input: &UpdateYear) -> Result<Year, ApiError>;
    async fn delete_year(&self, id: &str) -> Result<DeleteOutcome, ApiError>;

    // -- specialties --
    async fn list_specialties(&self, year_id: Option<&str>) -> Result<Vec<Specialty>, ApiError>;
    async fn create_specialty(&self, input: &CreateSpecialty) -> Result<Specialty, ApiError>;
    async fn update_specialty(
        &self,
        id: &str,
        input: &UpdateSpecialty,
    ) -> Result<Specialty, ApiError>;
    async fn delete_specialty(&self, id: &str) -> Result<DeleteOutcome, ApiError>;

    // -- modules --
    async fn list_modules(&self, query: &ModuleQuery) -> Result<Vec<CourseModule>, ApiError>;
    async fn create_module(&self, input: &CreateCourseModule) -> Result<CourseModule, ApiError>;
    async fn update_module(
        &self,
        id: &str,
        input: &UpdateCourseModule,
    ) -> Result<CourseModule, ApiError>;
    async fn delete_module(&self, id: &str) -> Result<DeleteOutcome, ApiError>;

    // -- resources --
    async fn list_resources(&self, module_id: Option<&str>) -> Result<Vec<Resource>, ApiError>;
    async fn create_resource(&self, input: &CreateResource) -> Result<Resource, ApiError>;
    async fn update_resource(&self, id: &str, input: &UpdateResource)
        -> Result<Resource, ApiError>;
    async fn delete_resource(&self, id: &str) -> Result<DeleteOutcome, ApiError>;
    async fn upload_resource_file(&self, id: &str, file: &FileUpload)
        -> Result<Resource, ApiError>;
    async fn import_resources(&self, module_id: &str, text: &str)
        -> Result<ImportOutcome, ApiError>;

    // -- users --
    async fn list_users(&self) -> Result<Vec<AdminUserView>, ApiError>;
    async fn create_user(&self, input: &CreateUserProfile) -> Result<AdminUserView, ApiError>;
    async fn update_user(
        &self,
        uid: &str,
        input: &UpdateUserProfile,
    ) -> Result<AdminUserView, ApiError>;
    async fn delete_user(&self, uid: &str) -> Result<DeleteOutcome, ApiError>;
    async fn toggle_admin(&self, uid: &str) -> Result<AdminUserView, ApiError>;
}
