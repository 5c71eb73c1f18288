//! Response cache (spec.md §4.J): content-addressed caching of completed
//! answers, keyed by mode + normalized input, backed by a [`KvStore`].

use std::sync::Arc;

use common::{error::AppError, ids::cache_key, model::CacheEntry, storage::KvStore};
use tracing::instrument;

const CACHE_NAMESPACE: &str = "response_cache";

pub struct ResponseCache<K: KvStore> {
    kv: Arc<K>,
}

impl<K: KvStore> ResponseCache<K> {
    pub fn new(kv: Arc<K>) -> Self {
        Self { kv }
    }

    #[instrument(level = "debug", skip_all, fields(mode = %mode))]
    pub async fn get(&self, mode: &str, input: &str, cache_type: &str) -> Result<Option<CacheEntry>, AppError> {
        let key = cache_key(mode, input, cache_type);
        match self.kv.get(CACHE_NAMESPACE, &key).await? {
            Some(raw) => {
                let entry: CacheEntry = serde_json::from_str(&raw).map_err(|e| AppError::Parsing(format!("cache entry: {e}")))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    #[instrument(level = "debug", skip_all, fields(mode = %mode))]
    pub async fn put(&self, mode: &str, input: &str, cache_type: &str, response: String, quantized: bool) -> Result<(), AppError> {
        let key = cache_key(mode, input, cache_type);
        let entry = CacheEntry::new(key.clone(), mode.to_string(), input.to_string(), response, quantized);
        let raw = serde_json::to_string(&entry).map_err(|e| AppError::Parsing(format!("cache entry: {e}")))?;
        self.kv.put(CACHE_NAMESPACE, &key, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::storage::InMemoryKv;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = ResponseCache::new(Arc::new(InMemoryKv::default()));
        cache.put("hybrid", "what is the capital", "answer", "Paris".to_string(), false).await.unwrap();

        let hit = cache.get("hybrid", "what is the capital", "answer").await.unwrap();
        assert_eq!(hit.unwrap().response, "Paris");
    }

    #[tokio::test]
    async fn miss_returns_none() {
        let cache = ResponseCache::new(Arc::new(InMemoryKv::default()));
        let hit = cache.get("hybrid", "unseen query", "answer").await.unwrap();
        assert!(hit.is_none());
    }
}
