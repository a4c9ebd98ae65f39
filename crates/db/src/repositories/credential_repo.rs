//! Repository for the `credentials` collection.

use chrono::Utc;
use cursus_core::types::Timestamp;
use serde_json::Value;

use super::collections::CREDENTIALS;
use super::decode_opt;
use crate::models::credential::{CreateCredential, Credential};
use crate::store::{Data, DocumentStore, Query, StoreError};

pub struct CredentialRepo;

impl CredentialRepo {
    pub async fn create(
        store: &dyn DocumentStore,
        input: &CreateCredential,
    ) -> Result<Credential, StoreError> {
        let mut data = Data::new();
        data.insert("email".into(), Value::String(input.email.clone()));
        data.insert(
            "password_hash".into(),
            Value::String(input.password_hash.clone()),
        );
        data.insert("failed_login_count".into(), Value::from(0));
        data.insert("locked_until".into(), Value::Null);
        let doc = store.insert(CREDENTIALS, Some(&input.uid), data).await?;
        doc.decode(CREDENTIALS)
    }

    pub async fn find_by_uid(
        store: &dyn DocumentStore,
        uid: &str,
    ) -> Result<Option<Credential>, StoreError> {
        decode_opt(store.get(CREDENTIALS, uid).await?, CREDENTIALS)
    }

    pub async fn find_by_email(
        store: &dyn DocumentStore,
        email: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let docs = store
            .query(&Query::new(CREDENTIALS).filter("email", email).limit(1))
            .await?;
        decode_opt(docs.into_iter().next(), CREDENTIALS)
    }

    /// Store a failed attempt count and, when the threshold was reached,
    /// the time the lock ends. `None` clears any expired lock.
    pub async fn record_failed_login(
        store: &dyn DocumentStore,
        uid: &str,
        failed_login_count: i32,
        locked_until: Option<Timestamp>,
    ) -> Result<(), StoreError> {
        let mut patch = Data::new();
        patch.insert("failed_login_count".into(), Value::from(failed_login_count));
        patch.insert("locked_until".into(), serde_json::to_value(locked_until)?);
        store.merge(CREDENTIALS, uid, patch).await?;
        Ok(())
    }

    /// Reset the failure counter and clear any lock.
    pub async fn record_successful_login(
        store: &dyn DocumentStore,
        uid: &str,
    ) -> Result<(), StoreError> {
        let mut patch = Data::new();
        patch.insert("failed_login_count".into(), Value::from(0));
        patch.insert("locked_until".into(), Value::Null);
        patch.insert("last_login_at".into(), serde_json::to_value(Utc::now())?);
        store.merge(CREDENTIALS, uid, patch).await?;
        Ok(())
    }

    /// Keep the login email in sync with the profile.
    pub async fn update_email(
        store: &dyn DocumentStore,
        uid: &str,
        email: &str,
    ) -> Result<bool, StoreError> {
        let mut patch = Data::new();
        patch.insert("email".into(), Value::String(email.to_string()));
        Ok(store.merge(CREDENTIALS, uid, patch).await?.is_some())
    }

    pub async fn delete(store: &dyn DocumentStore, uid: &str) -> Result<bool, StoreError> {
        store.delete(CREDENTIALS, uid).await
    }
}
