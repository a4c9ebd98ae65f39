//! Login sessions. One document per issued access token, keyed by its `jti`.
//! Logging out deletes the document; expired ones are swept at login and at
//! startup.

use cursus_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};

/// A document from the `sessions` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(alias = "id")]
    pub jti: String,
    pub uid: DocId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Session {
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.expires_at > now
    }
}

/// DTO for creating a session.
pub struct CreateSession {
    pub jti: String,
    pub uid: DocId,
    pub expires_at: Timestamp,
}
