use async_trait::async_trait;

use crate::error::AppError;

/// Namespaced key-value storage for chunks, cache entries, and any other
/// record addressed purely by id (spec.md §4.A, §4.J).
///
/// `namespace` plays the role the teacher's `StoredObject::table_name`
/// plays for `SurrealDbClient` — callers pass the record kind's table name
/// (`"text_chunk"`, `"cache"`, ...) so one store can back several record
/// kinds without colliding ids.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, AppError>;
    async fn put(&self, namespace: &str, key: &str, value: String) -> Result<(), AppError>;
    async fn delete(&self, namespace: &str, key: &str) -> Result<(), AppError>;
    async fn exists(&self, namespace: &str, key: &str) -> Result<bool, AppError> {
        Ok(self.get(namespace, key).await?.is_some())
    }
    async fn scan_prefix(&self, namespace: &str, prefix: &str) -> Result<Vec<(String, String)>, AppError>;
}
