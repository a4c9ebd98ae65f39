//! Collection/document storage.
//!
//! A [`DocumentStore`] holds JSON object documents grouped in named
//! collections. Keys are either assigned by the caller (slugs, uids) or by
//! the store (UUID v4). Queries support equality filters, one ascending
//! sort field, and a limit; results are always tie-broken by key so listings
//! are stable. Both backends order results with [`order_documents`], so a
//! listing reads the same whichever backend serves it. Timestamps are set by
//! the store.

use std::cmp::Ordering;

use async_trait::async_trait;
use cursus_core::slug::fold_diacritics;
use cursus_core::types::{DocId, Timestamp};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// JSON object payload of a document.
pub type Data = Map<String, Value>;

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document {collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    #[error("Document {collection}/{id} could not be decoded: {reason}")]
    Decode {
        collection: String,
        id: String,
        reason: String,
    },
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub data: Data,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Document {
    /// Decode into a typed row. `id`, `created_at` and `updated_at` are
    /// injected from the document metadata.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> Result<T, StoreError> {
        let mut map = self.data.clone();
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("created_at".into(), serde_json::to_value(self.created_at)?);
        map.insert("updated_at".into(), serde_json::to_value(self.updated_at)?);
        serde_json::from_value(Value::Object(map)).map_err(|e| StoreError::Decode {
            collection: collection.to_string(),
            id: self.id.clone(),
            reason: e.to_string(),
        })
    }
}

/// Equality filter on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether `data` satisfies this filter.
    pub fn matches(&self, data: &Data) -> bool {
        data.get(&self.field) == Some(&self.value)
    }
}

/// Fold filters into one containment object (`{field: value, ...}`).
pub fn filters_to_object(filters: &[Filter]) -> Value {
    let mut obj = Map::new();
    for filter in filters {
        obj.insert(filter.field.clone(), filter.value.clone());
    }
    Value::Object(obj)
}

/// A collection query: equality filters, ascending sort, optional limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<String>,
    pub limit: Option<i64>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(field, value));
        self
    }

    /// Add an equality filter only when `value` is present.
    pub fn filter_opt(self, field: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.filter(field, v),
            None => self,
        }
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Ascending order of two optional JSON values, missing and null last.
///
/// Numbers compare numerically. Strings compare ignoring case and accents,
/// then byte-wise. Values of different kinds are ranked by kind.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Array(_) => 3,
            Value::Object(_) => 4,
            Value::Null => 5,
        }
    }
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => fold_diacritics(x)
            .cmp(&fold_diacritics(y))
            .then_with(|| x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Sort `docs` by the query's field, key order breaking ties, then apply its
/// limit.
pub fn order_documents(docs: &mut Vec<Document>, query: &Query) {
    match &query.order_by {
        Some(field) => docs.sort_by(|a, b| {
            compare_values(a.data.get(field), b.data.get(field)).then_with(|| a.id.cmp(&b.id))
        }),
        None => docs.sort_by(|a, b| a.id.cmp(&b.id)),
    }
    if let Some(limit) = query.limit {
        docs.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
    }
}

/// Storage backend for catalog documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Number of documents in `collection` matching every filter.
    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<u64, StoreError>;

    /// Insert a document. `id == None` lets the store assign a UUID key;
    /// a caller-assigned key that already exists fails with
    /// [`StoreError::AlreadyExists`].
    async fn insert(
        &self,
        collection: &str,
        id: Option<&str>,
        data: Data,
    ) -> Result<Document, StoreError>;

    /// Shallow-merge `patch` into an existing document and bump
    /// `updated_at`. Returns `None` if the document does not exist.
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        patch: Data,
    ) -> Result<Option<Document>, StoreError>;

    /// Delete a document. Returns `true` if it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
