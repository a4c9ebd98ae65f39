//! Repository for the `admins` collection.
//!
//! A document keyed by uid grants console access; its absence revokes it.
//! The marker only records who granted it (`granted_by`).

use std::collections::HashSet;

use serde_json::Value;

use super::collections::ADMINS;
use crate::store::{Data, DocumentStore, Query, StoreError};

pub struct AdminRepo;

impl AdminRepo {
    pub async fn is_admin(store: &dyn DocumentStore, uid: &str) -> Result<bool, StoreError> {
        Ok(store.get(ADMINS, uid).await?.is_some())
    }

    /// Create the marker for `uid`. Returns `false` if it already existed.
    pub async fn grant(
        store: &dyn DocumentStore,
        uid: &str,
        granted_by: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut data = Data::new();
        data.insert(
            "granted_by".into(),
            granted_by.map_or(Value::Null, |g| Value::String(g.to_string())),
        );
        match store.insert(ADMINS, Some(uid), data).await {
            Ok(_) => Ok(true),
            Err(StoreError::AlreadyExists { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Remove the marker for `uid`. Returns `true` if it existed.
    pub async fn revoke(store: &dyn DocumentStore, uid: &str) -> Result<bool, StoreError> {
        store.delete(ADMINS, uid).await
    }

    /// Uids of every administrator.
    pub async fn list_uids(store: &dyn DocumentStore) -> Result<HashSet<String>, StoreError> {
        let docs = store.query(&Query::new(ADMINS)).await?;
        Ok(docs.into_iter().map(|doc| doc.id).collect())
    }
}
