use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;

/// A directed path spanning more than two entities, extracted as a single
/// record rather than decomposed into pairwise edges (spec.md §3 multi-hop
/// relations). Order-dependent: `A -> B -> C` is a distinct record from
/// `C -> B -> A`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MultiHopRelation {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub path: Vec<String>,
    pub description: String,
    pub source_ids: String,
    pub user_id: String,
}

impl MultiHopRelation {
    pub fn new(path: Vec<String>, description: String, source_id: String, user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: ids::multi_hop_id(&path),
            created_at: now,
            updated_at: now,
            path,
            description,
            source_ids: source_id,
            user_id,
        }
    }
}
