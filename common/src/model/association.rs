use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;

/// An undirected group association among 2+ entities that doesn't reduce to
/// a single labeled relationship (spec.md §3 associations) — e.g. "these
/// three people attended the same meeting". Order-independent, unlike
/// [`crate::model::MultiHopRelation`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Association {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub entities: Vec<String>,
    pub description: String,
    pub source_ids: String,
    pub user_id: String,
}

impl Association {
    pub fn new(mut entities: Vec<String>, description: String, source_id: String, user_id: String) -> Self {
        entities.sort();
        entities.dedup();
        let now = Utc::now();
        Self {
            id: ids::association_id(&entities),
            created_at: now,
            updated_at: now,
            entities,
            description,
            source_ids: source_id,
            user_id,
        }
    }
}
