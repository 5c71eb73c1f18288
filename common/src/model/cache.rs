use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content-addressed response cache entry (spec.md §4.J). `quantized`
/// records whether the cached answer was produced under a quantization
/// policy so downstream consumers can tell a lossy cache hit from an exact
/// one without re-deriving it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub mode: String,
    pub query: String,
    pub response: String,
    pub quantized: bool,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: String, mode: String, query: String, response: String, quantized: bool) -> Self {
        Self { key, mode, query, response, quantized, created_at: Utc::now() }
    }
}
