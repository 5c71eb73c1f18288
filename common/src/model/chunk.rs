use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;

/// A token-bounded slice of a source document (spec.md §4.C chunker).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TextChunk {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub document_id: String,
    pub order: usize,
    pub content: String,
    pub token_count: usize,
    pub user_id: String,
    pub embedding: Option<Vec<f32>>,
    /// Source document path this chunk was cut from (spec.md §3).
    pub file_path: String,
}

impl TextChunk {
    pub fn new(document_id: String, order: usize, content: String, token_count: usize, user_id: String, file_path: String) -> Self {
        let now = Utc::now();
        Self {
            id: ids::chunk_id(&content),
            created_at: now,
            updated_at: now,
            document_id,
            order,
            content,
            token_count,
            user_id,
            embedding: None,
            file_path,
        }
    }
}
