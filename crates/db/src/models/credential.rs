//! Password credentials, keyed by user uid.

use cursus_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};

/// A document from the `credentials` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    #[serde(alias = "id")]
    pub uid: DocId,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub failed_login_count: i32,
    #[serde(default)]
    pub locked_until: Option<Timestamp>,
}

impl Credential {
    /// Whether the account is locked at `now`.
    pub fn is_locked(&self, now: Timestamp) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

/// DTO for storing a new credential.
pub struct CreateCredential {
    pub uid: DocId,
    pub email: String,
    pub password_hash: String,
}
