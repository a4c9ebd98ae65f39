//! Repository for the `users` collection (roster profiles keyed by uid).

use cursus_core::catalog::{CreateUserProfile, UpdateUserProfile, UserProfile};
use serde::Serialize;

use super::collections::USERS;
use super::{clear_blank, decode_all, decode_opt, to_data};
use crate::store::{DocumentStore, Query, StoreError};

/// Stored profile fields; the uid is the document key.
#[derive(Serialize)]
struct ProfileData<'a> {
    email: &'a str,
    full_name: &'a str,
    matricule: Option<&'a str>,
    year: Option<&'a str>,
    speciality: Option<&'a str>,
}

pub struct UserRepo;

impl UserRepo {
    /// Insert a profile for `uid`. The password in `input` is not stored
    /// here; see [`super::CredentialRepo`].
    pub async fn create(
        store: &dyn DocumentStore,
        uid: &str,
        input: &CreateUserProfile,
    ) -> Result<UserProfile, StoreError> {
        let data = ProfileData {
            email: &input.email,
            full_name: &input.full_name,
            matricule: input.matricule.as_deref(),
            year: input.year.as_deref(),
            speciality: input.speciality.as_deref(),
        };
        let doc = store.insert(USERS, Some(uid), to_data(&data)?).await?;
        doc.decode(USERS)
    }

    pub async fn find_by_id(
        store: &dyn DocumentStore,
        uid: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        decode_opt(store.get(USERS, uid).await?, USERS)
    }

    pub async fn find_by_email(
        store: &dyn DocumentStore,
        email: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        let docs = store
            .query(&Query::new(USERS).filter("email", email).limit(1))
            .await?;
        decode_opt(docs.into_iter().next(), USERS)
    }

    /// List all profiles by full name.
    pub async fn list(store: &dyn DocumentStore) -> Result<Vec<UserProfile>, StoreError> {
        let docs = store
            .query(&Query::new(USERS).order_by("full_name"))
            .await?;
        decode_all(docs, USERS)
    }

    pub async fn update(
        store: &dyn DocumentStore,
        uid: &str,
        input: &UpdateUserProfile,
    ) -> Result<Option<UserProfile>, StoreError> {
        let mut patch = to_data(input)?;
        clear_blank(&mut patch, &["matricule", "year", "speciality"]);
        decode_opt(store.merge(USERS, uid, patch).await?, USERS)
    }

    pub async fn delete(store: &dyn DocumentStore, uid: &str) -> Result<bool, StoreError> {
        store.delete(USERS, uid).await
    }
}
