//! In-process document store used for local development and tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{order_documents, Data, Document, DocumentStore, Filter, Query, StoreError};

type Collection = BTreeMap<String, Document>;

/// A [`DocumentStore`] kept entirely in memory. Contents are lost on drop.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_all(filters: &[Filter], data: &Data) -> bool {
    filters.iter().all(|f| f.matches(data))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<Document> = docs
            .values()
            .filter(|doc| matches_all(&query.filters, &doc.data))
            .cloned()
            .collect();
        order_documents(&mut hits, query);
        Ok(hits)
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| matches_all(filters, &doc.data))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn insert(
        &self,
        collection: &str,
        id: Option<&str>,
        data: Data,
    ) -> Result<Document, StoreError> {
        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id,
            });
        }

        let now = Utc::now();
        let doc = Document {
            id: id.clone(),
            data,
            created_at: now,
            updated_at: now,
        };
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        patch: Data,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
        else {
            return Ok(None);
        };
        doc.data.extend(patch);
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
