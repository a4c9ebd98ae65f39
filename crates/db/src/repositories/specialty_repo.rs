//! Repository for the `specialties` collection.

use cursus_core::catalog::{CreateSpecialty, Specialty, UpdateSpecialty};
use cursus_core::integrity::{DeleteOutcome, SPECIALTY_DEPENDENTS};

use super::collections::{MODULES, SPECIALTIES};
use super::{clear_blank, decode_all, decode_opt, guarded_delete, to_data};
use crate::store::{DocumentStore, Query, StoreError};

pub struct SpecialtyRepo;

impl SpecialtyRepo {
    /// Insert a specialty under the caller-derived key `id`.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if a specialty with the
    /// same key exists.
    pub async fn create(
        store: &dyn DocumentStore,
        id: &str,
        input: &CreateSpecialty,
    ) -> Result<Specialty, StoreError> {
        let doc = store.insert(SPECIALTIES, Some(id), to_data(input)?).await?;
        doc.decode(SPECIALTIES)
    }

    pub async fn find_by_id(
        store: &dyn DocumentStore,
        id: &str,
    ) -> Result<Option<Specialty>, StoreError> {
        decode_opt(store.get(SPECIALTIES, id).await?, SPECIALTIES)
    }

    /// List specialties by name, optionally restricted to one year.
    pub async fn list(
        store: &dyn DocumentStore,
        year_id: Option<&str>,
    ) -> Result<Vec<Specialty>, StoreError> {
        let query = Query::new(SPECIALTIES)
            .filter_opt("year_id", year_id)
            .order_by("name");
        decode_all(store.query(&query).await?, SPECIALTIES)
    }

    pub async fn update(
        store: &dyn DocumentStore,
        id: &str,
        input: &UpdateSpecialty,
    ) -> Result<Option<Specialty>, StoreError> {
        let mut patch = to_data(input)?;
        clear_blank(&mut patch, &["icon"]);
        decode_opt(store.merge(SPECIALTIES, id, patch).await?, SPECIALTIES)
    }

    /// Delete a specialty unless modules still reference it.
    pub async fn delete(
        store: &dyn DocumentStore,
        id: &str,
    ) -> Result<Option<DeleteOutcome>, StoreError> {
        guarded_delete(
            store,
            SPECIALTIES,
            id,
            SPECIALTY_DEPENDENTS,
            MODULES,
            "specialty_id",
        )
        .await
    }
}
