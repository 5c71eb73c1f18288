use async_trait::async_trait;

use crate::{
    error::AppError,
    model::{Association, Edge, Entity, MultiHopRelation},
};

/// Graph storage: entities as nodes, edges/associations/multi-hop relations
/// as the ways they connect (spec.md §3, §4.A, §4.E, §4.G).
///
/// Mirrors the shape of the teacher's entity/relationship CRUD plus the
/// `find_entities_by_relationship_by_id` neighbor query, generalized to the
/// three connector kinds this system extracts instead of one relation
/// table, and adding the connectivity query the retrieval engine's
/// graph-distance scoring needs (spec.md §4.G).
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn upsert_entity(&self, entity: Entity) -> Result<(), AppError>;
    async fn get_entity(&self, id: &str) -> Result<Option<Entity>, AppError>;
    async fn get_entities_by_name(&self, user_id: &str, name: &str) -> Result<Vec<Entity>, AppError>;

    async fn upsert_edge(&self, edge: Edge) -> Result<(), AppError>;
    async fn get_edge(&self, id: &str) -> Result<Option<Edge>, AppError>;
    async fn edges_of(&self, entity_id: &str) -> Result<Vec<Edge>, AppError>;

    async fn upsert_association(&self, association: Association) -> Result<(), AppError>;
    async fn associations_of(&self, entity_id: &str) -> Result<Vec<Association>, AppError>;

    async fn upsert_multi_hop(&self, relation: MultiHopRelation) -> Result<(), AppError>;
    async fn multi_hops_of(&self, entity_id: &str) -> Result<Vec<MultiHopRelation>, AppError>;

    /// Direct neighbors reachable via any edge, association, or multi-hop
    /// path touching `entity_id` (spec.md §4.G local-mode expansion).
    async fn neighbors(&self, entity_id: &str, limit: usize) -> Result<Vec<Entity>, AppError>;

    /// Shortest-path hop count between two entities, or `None` if they are
    /// disconnected (spec.md §4.G connectivity scoring:
    /// `Σ 1/(shortest_path_length+1)`). Callers bound the search so a
    /// disconnected pair in a large graph doesn't traverse every node.
    async fn shortest_path_len(&self, from: &str, to: &str, max_hops: usize) -> Result<Option<usize>, AppError>;

    /// All entities for a user, for community detection and global-mode
    /// theme aggregation (spec.md §4.G, §9 Open Question a).
    async fn all_entities(&self, user_id: &str) -> Result<Vec<Entity>, AppError>;

    /// Recomputes community labels for every entity belonging to `user_id`,
    /// keyed by entity id (spec.md §4.E post-merge fan-out, §9 Open Question
    /// a). Cheap to call repeatedly — implementations are expected to cache
    /// behind a dirty flag the way [`crate::storage::InMemoryGraph`] does.
    async fn detect_communities(&self, user_id: &str) -> Result<std::collections::HashMap<String, usize>, AppError>;
}
