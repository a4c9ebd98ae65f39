//! Repository for the `years` collection.

use cursus_core::catalog::{CreateYear, UpdateYear, Year};
use cursus_core::integrity::{DeleteOutcome, YEAR_DEPENDENTS};

use super::collections::{SPECIALTIES, YEARS};
use super::{decode_all, decode_opt, guarded_delete, to_data};
use crate::store::{DocumentStore, Query, StoreError};

/// Provides CRUD operations for academic years.
pub struct YearRepo;

impl YearRepo {
    /// Insert a year under a server-assigned key.
    pub async fn create(store: &dyn DocumentStore, input: &CreateYear) -> Result<Year, StoreError> {
        let doc = store.insert(YEARS, None, to_data(input)?).await?;
        doc.decode(YEARS)
    }

    pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> Result<Option<Year>, StoreError> {
        decode_opt(store.get(YEARS, id).await?, YEARS)
    }

    /// List all years by `order`, then key.
    pub async fn list(store: &dyn DocumentStore) -> Result<Vec<Year>, StoreError> {
        let docs = store.query(&Query::new(YEARS).order_by("order")).await?;
        decode_all(docs, YEARS)
    }

    /// Apply the present fields of `input`. Returns `None` if the year does not exist.
    pub async fn update(
        store: &dyn DocumentStore,
        id: &str,
        input: &UpdateYear,
    ) -> Result<Option<Year>, StoreError> {
        decode_opt(store.merge(YEARS, id, to_data(input)?).await?, YEARS)
    }

    /// Delete a year unless specialties still reference it.
    pub async fn delete(
        store: &dyn DocumentStore,
        id: &str,
    ) -> Result<Option<DeleteOutcome>, StoreError> {
        guarded_delete(store, YEARS, id, YEAR_DEPENDENTS, SPECIALTIES, "year_id").await
    }
}
