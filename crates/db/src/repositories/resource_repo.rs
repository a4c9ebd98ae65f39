//! Repository for the `resources` collection.

use cursus_core::catalog::{CreateResource, Resource, UpdateResource};
use serde_json::Value;

use super::collections::RESOURCES;
use super::{clear_blank, decode_all, decode_opt, to_data};
use crate::store::{Data, DocumentStore, Query, StoreError};

pub struct ResourceRepo;

impl ResourceRepo {
    /// Insert a resource under a server-assigned key. A missing URL is
    /// stored as the empty string until a file is uploaded.
    pub async fn create(
        store: &dyn DocumentStore,
        input: &CreateResource,
    ) -> Result<Resource, StoreError> {
        let mut data = to_data(input)?;
        if matches!(data.get("url"), None | Some(Value::Null)) {
            data.insert("url".into(), Value::String(String::new()));
        }
        let doc = store.insert(RESOURCES, None, data).await?;
        doc.decode(RESOURCES)
    }

    /// Insert several resources one by one, stopping at the first failure.
    pub async fn create_many(
        store: &dyn DocumentStore,
        inputs: &[CreateResource],
    ) -> Result<Vec<Resource>, StoreError> {
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(Self::create(store, input).await?);
        }
        Ok(created)
    }

    pub async fn find_by_id(
        store: &dyn DocumentStore,
        id: &str,
    ) -> Result<Option<Resource>, StoreError> {
        decode_opt(store.get(RESOURCES, id).await?, RESOURCES)
    }

    /// List resources by title, optionally restricted to one module.
    pub async fn list(
        store: &dyn DocumentStore,
        module_id: Option<&str>,
    ) -> Result<Vec<Resource>, StoreError> {
        let query = Query::new(RESOURCES)
            .filter_opt("module_id", module_id)
            .order_by("title");
        decode_all(store.query(&query).await?, RESOURCES)
    }

    pub async fn update(
        store: &dyn DocumentStore,
        id: &str,
        input: &UpdateResource,
    ) -> Result<Option<Resource>, StoreError> {
        let mut patch = to_data(input)?;
        clear_blank(&mut patch, &["source"]);
        decode_opt(store.merge(RESOURCES, id, patch).await?, RESOURCES)
    }

    /// Point a resource at an uploaded file.
    pub async fn set_file(
        store: &dyn DocumentStore,
        id: &str,
        url: &str,
        storage_path: &str,
    ) -> Result<Option<Resource>, StoreError> {
        let mut patch = Data::new();
        patch.insert("url".into(), Value::String(url.to_string()));
        patch.insert(
            "storage_path".into(),
            Value::String(storage_path.to_string()),
        );
        decode_opt(store.merge(RESOURCES, id, patch).await?, RESOURCES)
    }

    /// Delete a resource, returning the removed document so the caller can
    /// release its stored file. Resources have no dependents.
    pub async fn delete(
        store: &dyn DocumentStore,
        id: &str,
    ) -> Result<Option<Resource>, StoreError> {
        let Some(resource) = Self::find_by_id(store, id).await? else {
            return Ok(None);
        };
        store.delete(RESOURCES, id).await?;
        Ok(Some(resource))
    }
}
