//! One zero-sized repository per collection.
//!
//! Every repository takes the [`DocumentStore`] as its first argument and
//! expects inputs that have already been normalized by the core
//! validators.

use cursus_core::integrity::{DeleteOutcome, DependentRule};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::store::{Data, Document, DocumentStore, Filter, StoreError};

pub mod admin_repo;
pub mod credential_repo;
pub mod module_repo;
pub mod resource_repo;
pub mod session_repo;
pub mod specialty_repo;
pub mod user_repo;
pub mod year_repo;

pub use admin_repo::AdminRepo;
pub use credential_repo::CredentialRepo;
pub use module_repo::{ModuleFilter, ModuleRepo};
pub use resource_repo::ResourceRepo;
pub use session_repo::SessionRepo;
pub use specialty_repo::SpecialtyRepo;
pub use user_repo::UserRepo;
pub use year_repo::YearRepo;

/// Collection names.
pub mod collections {
    pub const YEARS: &str = "years";
    pub const SPECIALTIES: &str = "specialties";
    pub const MODULES: &str = "modules";
    pub const RESOURCES: &str = "resources";
    pub const USERS: &str = "users";
    pub const ADMINS: &str = "admins";
    pub const CREDENTIALS: &str = "credentials";
    pub const SESSIONS: &str = "sessions";
}

/// Serialize an input struct into a document payload.
pub(crate) fn to_data<T: Serialize>(value: &T) -> Result<Data, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        )))),
    }
}

/// Turn blank strings in `fields` into `null`, so "clear" patches store no value.
pub(crate) fn clear_blank(data: &mut Data, fields: &[&str]) {
    for field in fields {
        if let Some(Value::String(s)) = data.get(*field) {
            if s.is_empty() {
                data.insert((*field).to_string(), Value::Null);
            }
        }
    }
}

pub(crate) fn decode_all<T: DeserializeOwned>(
    docs: Vec<Document>,
    collection: &str,
) -> Result<Vec<T>, StoreError> {
    docs.iter().map(|doc| doc.decode(collection)).collect()
}

pub(crate) fn decode_opt<T: DeserializeOwned>(
    doc: Option<Document>,
    collection: &str,
) -> Result<Option<T>, StoreError> {
    doc.map(|d| d.decode(collection)).transpose()
}

/// Delete `id` from `collection` unless documents in `dependents` still
/// reference it through `reference_field`.
///
/// Returns `None` when the target does not exist. The count and the delete
/// are separate operations; a dependent created in between is not seen.
pub(crate) async fn guarded_delete(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    rule: DependentRule,
    dependents: &str,
    reference_field: &str,
) -> Result<Option<DeleteOutcome>, StoreError> {
    if store.get(collection, id).await?.is_none() {
        return Ok(None);
    }

    let count = store
        .count(dependents, &[Filter::eq(reference_field, id)])
        .await?;
    let outcome = rule.evaluate(count);
    if !outcome.success {
        tracing::info!(collection, id, dependents, count, "Delete blocked by dependents");
        return Ok(Some(outcome));
    }

    store.delete(collection, id).await?;
    Ok(Some(outcome))
}
