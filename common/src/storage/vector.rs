use async_trait::async_trait;

use crate::error::AppError;

/// A single nearest-neighbor hit (spec.md §4.G vector signal): `id` keys
/// back into the owning namespace's records, `score` is cosine similarity
/// in `[-1, 1]`, `content` is the truncated payload stored alongside the
/// embedding at upsert time.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub content: String,
}

/// Vector similarity search over embedded records, namespaced the same way
/// as [`crate::storage::KvStore`] (spec.md §4.A, §4.G). `upsert` carries the
/// record's payload content alongside its embedding — callers are expected
/// to truncate it with [`crate::text::truncate_vector_content`] first
/// (spec.md §8: "Vector-store content never exceeds 65,000 characters").
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, namespace: &str, id: &str, embedding: Vec<f32>, content: String) -> Result<(), AppError>;
    async fn delete(&self, namespace: &str, id: &str) -> Result<(), AppError>;
    async fn query(
        &self,
        namespace: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorMatch>, AppError>;
}
