//! In-memory reference implementations of the storage traits. Production
//! wiring can swap these for a real backend; the test suites across the
//! workspace are written against these directly (spec.md §7 test tooling).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::{
    error::AppError,
    model::{Association, Edge, Entity, MultiHopRelation},
};

use super::{GraphStore, KvStore, VectorMatch, VectorStore};

#[derive(Default)]
pub struct InMemoryKv {
    data: RwLock<HashMap<(String, String), String>>,
}

#[async_trait]
impl KvStore for InMemoryKv {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, AppError> {
        let data = self.data.read().map_err(|_| AppError::Internal("kv lock poisoned".into()))?;
        Ok(data.get(&(namespace.to_owned(), key.to_owned())).cloned())
    }

    async fn put(&self, namespace: &str, key: &str, value: String) -> Result<(), AppError> {
        let mut data = self.data.write().map_err(|_| AppError::Internal("kv lock poisoned".into()))?;
        data.insert((namespace.to_owned(), key.to_owned()), value);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<(), AppError> {
        let mut data = self.data.write().map_err(|_| AppError::Internal("kv lock poisoned".into()))?;
        data.remove(&(namespace.to_owned(), key.to_owned()));
        Ok(())
    }

    async fn scan_prefix(&self, namespace: &str, prefix: &str) -> Result<Vec<(String, String)>, AppError> {
        let data = self.data.read().map_err(|_| AppError::Internal("kv lock poisoned".into()))?;
        Ok(data
            .iter()
            .filter(|((ns, key), _)| ns == namespace && key.starts_with(prefix))
            .map(|((_, key), value)| (key.clone(), value.clone()))
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryVector {
    data: RwLock<HashMap<String, HashMap<String, (Vec<f32>, String)>>>,
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for InMemoryVector {
    async fn upsert(&self, namespace: &str, id: &str, embedding: Vec<f32>, content: String) -> Result<(), AppError> {
        let mut data = self.data.write().map_err(|_| AppError::Internal("vector lock poisoned".into()))?;
        data.entry(namespace.to_owned()).or_default().insert(id.to_owned(), (embedding, content));
        Ok(())
    }

    async fn delete(&self, namespace: &str, id: &str) -> Result<(), AppError> {
        let mut data = self.data.write().map_err(|_| AppError::Internal("vector lock poisoned".into()))?;
        if let Some(ns) = data.get_mut(namespace) {
            ns.remove(id);
        }
        Ok(())
    }

    async fn query(&self, namespace: &str, embedding: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, AppError> {
        let data = self.data.read().map_err(|_| AppError::Internal("vector lock poisoned".into()))?;
        let Some(ns) = data.get(namespace) else {
            return Ok(Vec::new());
        };
        let mut matches: Vec<VectorMatch> = ns
            .iter()
            .map(|(id, (vec, content))| VectorMatch { id: id.clone(), score: cosine_similarity(embedding, vec), content: content.clone() })
            .collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);
        Ok(matches)
    }
}

/// In-memory graph. Community membership is recomputed lazily behind a
/// dirty flag rather than on every mutation (spec.md §9 Open Question a,
/// resolved in SPEC_FULL.md §4.G): cheap label-propagation only runs when
/// a caller asks for communities after the graph has changed.
#[derive(Default)]
pub struct InMemoryGraph {
    entities: RwLock<HashMap<String, Entity>>,
    edges: RwLock<HashMap<String, Edge>>,
    associations: RwLock<HashMap<String, Association>>,
    multi_hops: RwLock<HashMap<String, MultiHopRelation>>,
    communities: RwLock<Option<HashMap<String, usize>>>,
}

impl InMemoryGraph {
    /// Marks cached community assignments stale. Called by every mutating
    /// method; a reader that wants up-to-date communities calls
    /// [`InMemoryGraph::communities`] which recomputes on a `None` cache.
    fn mark_dirty(&self) {
        if let Ok(mut communities) = self.communities.write() {
            *communities = None;
        }
    }

    fn adjacency(&self) -> HashMap<String, HashSet<String>> {
        let mut adj: HashMap<String, HashSet<String>> = HashMap::new();
        if let Ok(edges) = self.edges.read() {
            for edge in edges.values() {
                adj.entry(edge.src.clone()).or_default().insert(edge.tgt.clone());
                adj.entry(edge.tgt.clone()).or_default().insert(edge.src.clone());
            }
        }
        if let Ok(assocs) = self.associations.read() {
            for assoc in assocs.values() {
                for a in &assoc.entities {
                    for b in &assoc.entities {
                        if a != b {
                            adj.entry(a.clone()).or_default().insert(b.clone());
                        }
                    }
                }
            }
        }
        if let Ok(mhs) = self.multi_hops.read() {
            for mh in mhs.values() {
                for pair in mh.path.windows(2) {
                    adj.entry(pair[0].clone()).or_default().insert(pair[1].clone());
                    adj.entry(pair[1].clone()).or_default().insert(pair[0].clone());
                }
            }
        }
        adj
    }

    /// Single-pass label propagation: every node adopts the most common
    /// label among its neighbors, seeded with one label per node. Cheap and
    /// deterministic enough for test fixtures; a production deployment
    /// would iterate to convergence or swap in a real Louvain pass.
    pub fn communities(&self, user_id: &str) -> Result<HashMap<String, usize>, AppError> {
        {
            let cached = self.communities.read().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
            if let Some(ref map) = *cached {
                return Ok(map.clone());
            }
        }

        let adj = self.adjacency();
        let entities = self.entities.read().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        let mut labels: HashMap<String, usize> = entities
            .values()
            .filter(|e| e.user_id == user_id)
            .enumerate()
            .map(|(idx, e)| (e.id.clone(), idx))
            .collect();

        for node in labels.clone().keys() {
            if let Some(neighbors) = adj.get(node) {
                let mut counts: HashMap<usize, usize> = HashMap::new();
                for n in neighbors {
                    if let Some(label) = labels.get(n) {
                        *counts.entry(*label).or_default() += 1;
                    }
                }
                if let Some((&best, _)) = counts.iter().max_by_key(|(_, count)| **count) {
                    labels.insert(node.clone(), best);
                }
            }
        }

        let mut cache = self.communities.write().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        *cache = Some(labels.clone());
        Ok(labels)
    }
}

#[async_trait]
impl GraphStore for InMemoryGraph {
    async fn upsert_entity(&self, entity: Entity) -> Result<(), AppError> {
        let mut entities = self.entities.write().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        entities.insert(entity.id.clone(), entity);
        drop(entities);
        self.mark_dirty();
        Ok(())
    }

    async fn get_entity(&self, id: &str) -> Result<Option<Entity>, AppError> {
        let entities = self.entities.read().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        Ok(entities.get(id).cloned())
    }

    async fn get_entities_by_name(&self, user_id: &str, name: &str) -> Result<Vec<Entity>, AppError> {
        let entities = self.entities.read().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        Ok(entities
            .values()
            .filter(|e| e.user_id == user_id && e.name == name)
            .cloned()
            .collect())
    }

    async fn upsert_edge(&self, edge: Edge) -> Result<(), AppError> {
        let mut edges = self.edges.write().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        edges.insert(edge.id.clone(), edge);
        drop(edges);
        self.mark_dirty();
        Ok(())
    }

    async fn get_edge(&self, id: &str) -> Result<Option<Edge>, AppError> {
        let edges = self.edges.read().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        Ok(edges.get(id).cloned())
    }

    async fn edges_of(&self, entity_id: &str) -> Result<Vec<Edge>, AppError> {
        let edges = self.edges.read().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        Ok(edges.values().filter(|e| e.src == entity_id || e.tgt == entity_id).cloned().collect())
    }

    async fn upsert_association(&self, association: Association) -> Result<(), AppError> {
        let mut assocs = self.associations.write().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        assocs.insert(association.id.clone(), association);
        drop(assocs);
        self.mark_dirty();
        Ok(())
    }

    async fn associations_of(&self, entity_id: &str) -> Result<Vec<Association>, AppError> {
        let assocs = self.associations.read().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        Ok(assocs.values().filter(|a| a.entities.iter().any(|e| e == entity_id)).cloned().collect())
    }

    async fn upsert_multi_hop(&self, relation: MultiHopRelation) -> Result<(), AppError> {
        let mut mhs = self.multi_hops.write().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        mhs.insert(relation.id.clone(), relation);
        drop(mhs);
        self.mark_dirty();
        Ok(())
    }

    async fn multi_hops_of(&self, entity_id: &str) -> Result<Vec<MultiHopRelation>, AppError> {
        let mhs = self.multi_hops.read().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        Ok(mhs.values().filter(|m| m.path.iter().any(|e| e == entity_id)).cloned().collect())
    }

    async fn neighbors(&self, entity_id: &str, limit: usize) -> Result<Vec<Entity>, AppError> {
        let adj = self.adjacency();
        let Some(neighbor_ids) = adj.get(entity_id) else {
            return Ok(Vec::new());
        };
        let entities = self.entities.read().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        let mut result: Vec<Entity> = neighbor_ids.iter().filter_map(|id| entities.get(id).cloned()).collect();
        if limit > 0 {
            result.truncate(limit);
        }
        Ok(result)
    }

    async fn shortest_path_len(&self, from: &str, to: &str, max_hops: usize) -> Result<Option<usize>, AppError> {
        if from == to {
            return Ok(Some(0));
        }
        let adj = self.adjacency();
        let mut visited: HashSet<String> = HashSet::from([from.to_owned()]);
        let mut frontier: VecDeque<(String, usize)> = VecDeque::from([(from.to_owned(), 0)]);

        while let Some((node, depth)) = frontier.pop_front() {
            if depth >= max_hops {
                continue;
            }
            let Some(neighbors) = adj.get(&node) else { continue };
            for n in neighbors {
                if n == to {
                    return Ok(Some(depth + 1));
                }
                if visited.insert(n.clone()) {
                    frontier.push_back((n.clone(), depth + 1));
                }
            }
        }
        Ok(None)
    }

    async fn all_entities(&self, user_id: &str) -> Result<Vec<Entity>, AppError> {
        let entities = self.entities.read().map_err(|_| AppError::Internal("graph lock poisoned".into()))?;
        Ok(entities.values().filter(|e| e.user_id == user_id).cloned().collect())
    }

    async fn detect_communities(&self, user_id: &str) -> Result<HashMap<String, usize>, AppError> {
        self.communities(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str) -> Entity {
        Entity::new(name.to_string(), "Person".to_string(), "desc".to_string(), "chunk-1".to_string(), String::new(), "u1".to_string())
    }

    #[tokio::test]
    async fn shortest_path_finds_direct_and_multi_hop() {
        let graph = InMemoryGraph::default();
        let a = entity("Alex");
        let b = entity("Taylor");
        let c = entity("Tokyo");
        graph.upsert_entity(a.clone()).await.unwrap();
        graph.upsert_entity(b.clone()).await.unwrap();
        graph.upsert_entity(c.clone()).await.unwrap();
        graph
            .upsert_edge(Edge::new(&a.id, &b.id, "knows".into(), "friendship".into(), 1.0, "chunk-1".into(), String::new(), "u1".into()))
            .await
            .unwrap();
        graph
            .upsert_edge(Edge::new(&b.id, &c.id, "visited".into(), "travel".into(), 1.0, "chunk-1".into(), String::new(), "u1".into()))
            .await
            .unwrap();

        assert_eq!(graph.shortest_path_len(&a.id, &b.id, 5).await.unwrap(), Some(1));
        assert_eq!(graph.shortest_path_len(&a.id, &c.id, 5).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn shortest_path_none_when_disconnected() {
        let graph = InMemoryGraph::default();
        let a = entity("Alex");
        let b = entity("Disconnected");
        graph.upsert_entity(a.clone()).await.unwrap();
        graph.upsert_entity(b.clone()).await.unwrap();

        assert_eq!(graph.shortest_path_len(&a.id, &b.id, 5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn communities_cache_invalidates_on_mutation() {
        let graph = InMemoryGraph::default();
        let a = entity("Alex");
        graph.upsert_entity(a.clone()).await.unwrap();
        let first = graph.communities("u1").unwrap();
        assert_eq!(first.len(), 1);

        let b = entity("Taylor");
        graph.upsert_entity(b.clone()).await.unwrap();
        let second = graph.communities("u1").unwrap();
        assert_eq!(second.len(), 2);
    }
}
