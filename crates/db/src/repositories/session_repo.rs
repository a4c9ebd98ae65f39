//! Repository for the `sessions` collection.

use chrono::Utc;
use cursus_core::types::Timestamp;
use serde_json::Value;

use super::collections::SESSIONS;
use super::decode_opt;
use crate::models::session::{CreateSession, Session};
use crate::store::{Data, DocumentStore, Query, StoreError};

pub struct SessionRepo;

impl SessionRepo {
    /// Insert a session keyed by its token id.
    pub async fn create(
        store: &dyn DocumentStore,
        input: &CreateSession,
    ) -> Result<Session, StoreError> {
        let mut data = Data::new();
        data.insert("uid".into(), Value::String(input.uid.clone()));
        data.insert("expires_at".into(), serde_json::to_value(input.expires_at)?);
        let doc = store.insert(SESSIONS, Some(&input.jti), data).await?;
        doc.decode(SESSIONS)
    }

    pub async fn find(store: &dyn DocumentStore, jti: &str) -> Result<Option<Session>, StoreError> {
        decode_opt(store.get(SESSIONS, jti).await?, SESSIONS)
    }

    /// Whether the session exists and has not expired.
    pub async fn is_active(store: &dyn DocumentStore, jti: &str) -> Result<bool, StoreError> {
        Ok(Self::find(store, jti)
            .await?
            .is_some_and(|s| s.is_active(Utc::now())))
    }

    /// Delete sessions that expired at or before `now`, only those of `uid`
    /// when given. Returns how many were removed.
    pub async fn delete_expired(
        store: &dyn DocumentStore,
        uid: Option<&str>,
        now: Timestamp,
    ) -> Result<u64, StoreError> {
        let query = Query::new(SESSIONS).filter_opt("uid", uid);
        let mut deleted = 0;
        for doc in store.query(&query).await? {
            let session: Session = doc.decode(SESSIONS)?;
            if !session.is_active(now) && store.delete(SESSIONS, &doc.id).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Remove every session of a user. Returns how many were removed.
    pub async fn delete_all_for_user(
        store: &dyn DocumentStore,
        uid: &str,
    ) -> Result<u64, StoreError> {
        let mut deleted = 0;
        for doc in store.query(&Query::new(SESSIONS).filter("uid", uid)).await? {
            if store.delete(SESSIONS, &doc.id).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
