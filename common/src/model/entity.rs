use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;

/// A node in the knowledge graph, merged idempotently from every extraction
/// record that names it (spec.md §3, §4.E).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub entity_type: String,
    /// `<SEP>`-joined description fragments, one per contributing chunk
    /// until summarization collapses them (spec.md §4.E).
    pub description: String,
    /// Source chunk ids this entity was observed in, `<SEP>`-joined.
    pub source_ids: String,
    /// Source document paths this entity was observed in, `<SEP>`-joined
    /// (spec.md §3). At least one of `source_ids`/`file_path` must be set or
    /// the merge engine rejects the node.
    pub file_path: String,
    pub user_id: String,
    pub embedding: Option<Vec<f32>>,
    /// `<SEP>`-joined free-form properties the extractor attached to this
    /// entity, unioned the same way `description` is (spec.md §4.E).
    pub additional_properties: String,
    /// `<SEP>`-joined thematic-domain guesses from extraction, overwritten
    /// wholesale by the post-merge community-detection pass when that's
    /// enabled (spec.md §4.E).
    pub entity_community: String,
}

impl Entity {
    pub fn new(name: String, entity_type: String, description: String, source_id: String, file_path: String, user_id: String) -> Self {
        let now = Utc::now();
        let standardized = crate::text::standardize_entity_name(&name);
        Self {
            id: ids::entity_id(&standardized),
            created_at: now,
            updated_at: now,
            name: standardized,
            entity_type,
            description,
            source_ids: source_id,
            file_path,
            user_id,
            embedding: None,
            additional_properties: String::new(),
            entity_community: String::new(),
        }
    }
}
