//! Repository for the `modules` collection.

use cursus_core::catalog::{CourseModule, CreateCourseModule, UpdateCourseModule};
use cursus_core::integrity::{DeleteOutcome, MODULE_DEPENDENTS};
use serde::Deserialize;
use serde_json::Value;

use super::collections::{MODULES, RESOURCES};
use super::{clear_blank, decode_all, decode_opt, guarded_delete, to_data};
use crate::store::{Data, DocumentStore, Query, StoreError};

/// Optional equality filters for listing modules.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleFilter {
    pub specialty_id: Option<String>,
    pub semester_key: Option<String>,
    pub year_id: Option<String>,
}

pub struct ModuleRepo;

impl ModuleRepo {
    /// Insert a module under the composite key `id`
    /// (`{specialty}_{semester}_{slug}`).
    pub async fn create(
        store: &dyn DocumentStore,
        id: &str,
        input: &CreateCourseModule,
    ) -> Result<CourseModule, StoreError> {
        let doc = store.insert(MODULES, Some(id), to_data(input)?).await?;
        doc.decode(MODULES)
    }

    pub async fn find_by_id(
        store: &dyn DocumentStore,
        id: &str,
    ) -> Result<Option<CourseModule>, StoreError> {
        decode_opt(store.get(MODULES, id).await?, MODULES)
    }

    /// List modules by name, restricted by every filter that is set.
    pub async fn list(
        store: &dyn DocumentStore,
        filter: &ModuleFilter,
    ) -> Result<Vec<CourseModule>, StoreError> {
        let query = Query::new(MODULES)
            .filter_opt("specialty_id", filter.specialty_id.as_deref())
            .filter_opt("semester_key", filter.semester_key.as_deref())
            .filter_opt("year_id", filter.year_id.as_deref())
            .order_by("name");
        decode_all(store.query(&query).await?, MODULES)
    }

    pub async fn update(
        store: &dyn DocumentStore,
        id: &str,
        input: &UpdateCourseModule,
    ) -> Result<Option<CourseModule>, StoreError> {
        let mut patch = to_data(input)?;
        clear_blank(&mut patch, &["module_code"]);
        decode_opt(store.merge(MODULES, id, patch).await?, MODULES)
    }

    /// Point every module of `specialty_id` at `year_id`. Returns how many
    /// modules changed year.
    pub async fn move_to_year(
        store: &dyn DocumentStore,
        specialty_id: &str,
        year_id: &str,
    ) -> Result<usize, StoreError> {
        let query = Query::new(MODULES).filter("specialty_id", specialty_id);
        let mut moved = 0;
        for doc in store.query(&query).await? {
            if doc.data.get("year_id").and_then(Value::as_str) == Some(year_id) {
                continue;
            }
            let mut patch = Data::new();
            patch.insert("year_id".into(), Value::String(year_id.to_string()));
            if store.merge(MODULES, &doc.id, patch).await?.is_some() {
                moved += 1;
            }
        }
        Ok(moved)
    }

    /// Delete a module unless resources still reference it.
    pub async fn delete(
        store: &dyn DocumentStore,
        id: &str,
    ) -> Result<Option<DeleteOutcome>, StoreError> {
        guarded_delete(store, MODULES, id, MODULE_DEPENDENTS, RESOURCES, "module_id").await
    }
}
