//! PostgreSQL backend: every collection lives in the single `documents`
//! table with its payload in a JSONB column.

use async_trait::async_trait;
use cursus_core::types::Timestamp;
use serde_json::Value;
use sqlx::PgPool;

use super::{
    filters_to_object, order_documents, Data, Document, DocumentStore, Filter, Query, StoreError,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, data, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: Value,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl DocumentRow {
    fn into_document(self) -> Document {
        let data = match self.data {
            Value::Object(map) => map,
            // The table has a CHECK constraint; anything else is treated as empty.
            _ => Data::new(),
        };
        Document {
            id: self.id,
            data,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A [`DocumentStore`] backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE collection = $1 AND id = $2");
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(DocumentRow::into_document))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        // Sorted queries are ordered in process, so the limit can only be
        // pushed down when no sort field is set. `LIMIT NULL` is no limit.
        let sql = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE collection = $1 AND data @> $2
             ORDER BY id COLLATE \"C\" ASC
             LIMIT $3"
        );
        let limit = query.order_by.is_none().then_some(query.limit).flatten();
        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(&query.collection)
            .bind(filters_to_object(&query.filters))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        let mut docs: Vec<Document> = rows.into_iter().map(DocumentRow::into_document).collect();
        order_documents(&mut docs, query);
        Ok(docs)
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE collection = $1 AND data @> $2",
        )
        .bind(collection)
        .bind(filters_to_object(filters))
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
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
        let query = format!(
            "INSERT INTO documents (collection, id, data)
             VALUES ($1, $2, $3)
             ON CONFLICT (collection, id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(collection)
            .bind(&id)
            .bind(Value::Object(data))
            .fetch_optional(&self.pool)
            .await?;
        row.map(DocumentRow::into_document)
            .ok_or_else(|| StoreError::AlreadyExists {
                collection: collection.to_string(),
                id,
            })
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        patch: Data,
    ) -> Result<Option<Document>, StoreError> {
        let query = format!(
            "UPDATE documents SET data = data || $3, updated_at = NOW()
             WHERE collection = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(collection)
            .bind(id)
            .bind(Value::Object(patch))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(DocumentRow::into_document))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
