use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;

/// Undirected canonical key for an edge: endpoints sorted so `(a, b)` and
/// `(b, a)` merge to the same record (spec.md §4.E edge merge rule —
/// relationships are undirected unless a Non-goal says otherwise).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub src: String,
    pub tgt: String,
}

impl EdgeKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self { src: a.to_string(), tgt: b.to_string() }
        } else {
            Self { src: b.to_string(), tgt: a.to_string() }
        }
    }

    pub fn id(&self) -> String {
        ids::edge_id(&self.src, &self.tgt)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub src: String,
    pub tgt: String,
    pub description: String,
    pub keywords: String,
    pub weight: f32,
    pub source_ids: String,
    /// Source document paths this edge was observed in, `<SEP>`-joined
    /// (spec.md §3). At least one of `source_ids`/`file_path` must be set or
    /// the merge engine rejects the edge.
    pub file_path: String,
    pub user_id: String,
}

impl Edge {
    pub fn new(
        src: &str,
        tgt: &str,
        description: String,
        keywords: String,
        weight: f32,
        source_id: String,
        file_path: String,
        user_id: String,
    ) -> Self {
        let key = EdgeKey::new(src, tgt);
        let now = Utc::now();
        Self {
            id: key.id(),
            created_at: now,
            updated_at: now,
            src: key.src,
            tgt: key.tgt,
            description,
            keywords,
            weight,
            source_ids: source_id,
            file_path,
            user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_key_is_order_independent() {
        assert_eq!(EdgeKey::new("a", "b").id(), EdgeKey::new("b", "a").id());
    }
}
