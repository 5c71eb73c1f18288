//! Hybrid retrieval engine (spec.md §4.G): dispatches on [`QueryMode`] to
//! combine vector search over entities/relationships/chunks with
//! graph-connectivity-weighted expansion, then truncates the assembled
//! context to a token budget.

use std::sync::Arc;

use common::{
    error::AppError,
    llm::LlmClient,
    model::{Edge, Entity, Keywords, MultiHopRelation, QueryMode},
    storage::{GraphStore, KvStore, VectorStore},
    text::Tokenizer,
};
use tracing::instrument;

use crate::scoring::{connectivity_score, fuse_scores, sort_by_fused_desc, FusionWeights, Scored, Scores};

#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub content: String,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct RetrievedEntity {
    pub entity: Entity,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct RetrievedEdge {
    pub edge: Edge,
    pub score: f32,
}

/// Assembled retrieval output, rendered as the four sections spec.md §4.H
/// expects: Entities(KG), Relationships(KG), Multi-hop Paths, and Document
/// Chunks(DC).
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub chunks: Vec<RetrievedChunk>,
    pub entities: Vec<RetrievedEntity>,
    pub relationships: Vec<RetrievedEdge>,
    pub multi_hop_paths: Vec<MultiHopRelation>,
}

/// A graph-side seed entity, carrying the vector-search score that found it
/// when one exists — `None` for seeds recovered only via the direct
/// name-lookup fallback (spec.md §4.G: vector search is the primary path,
/// direct lookup is the empty-result fallback).
type Seed = (Entity, Option<f32>);

pub struct RetrievalEngine<G: GraphStore, K: KvStore, V: VectorStore> {
    graph: Arc<G>,
    kv: Arc<K>,
    vector: Arc<V>,
    llm: Arc<LlmClient>,
    weights: FusionWeights,
    max_hops: usize,
}

impl<G: GraphStore, K: KvStore, V: VectorStore> RetrievalEngine<G, K, V> {
    pub fn new(graph: Arc<G>, kv: Arc<K>, vector: Arc<V>, llm: Arc<LlmClient>) -> Self {
        Self { graph, kv, vector, llm, weights: FusionWeights::default(), max_hops: 4 }
    }

    #[instrument(level = "info", skip_all, fields(mode = ?mode))]
    pub async fn retrieve(&self, query: &str, mode: QueryMode, keywords: &Keywords, user_id: &str, top_k: usize) -> Result<RetrievalResult, AppError> {
        match mode {
            QueryMode::Naive => self.retrieve_naive(query, top_k).await,
            QueryMode::Local => self.retrieve_local(keywords, user_id, top_k).await,
            QueryMode::Global => self.retrieve_global(keywords, user_id, top_k).await,
            QueryMode::Hybrid => self.retrieve_hybrid(keywords, user_id, top_k).await,
            QueryMode::Mix => self.retrieve_mix(query, keywords, user_id, top_k).await,
            // Bypass never calls retrieve() — the router short-circuits before
            // reaching this engine. Kept exhaustive rather than a wildcard so
            // a new QueryMode variant can't silently fall through unhandled.
            QueryMode::Bypass => Ok(RetrievalResult::default()),
        }
    }

    /// Pure vector search over document chunks, no graph signal (spec.md §4.G naive mode).
    async fn retrieve_naive(&self, query: &str, top_k: usize) -> Result<RetrievalResult, AppError> {
        let embedding = self.llm.embed(query).await?;
        let matches = self.vector.query("text_chunk", &embedding, top_k).await?;
        let mut chunks = Vec::with_capacity(matches.len());
        for m in matches {
            if let Some(content) = self.kv.get("text_chunk", &m.id).await? {
                chunks.push(RetrievedChunk { chunk_id: m.id, content, score: m.score });
            }
        }
        Ok(RetrievalResult { chunks, ..Default::default() })
    }

    /// Entity-centric expansion: vector search over the "entity" namespace
    /// seeded by low-level (entity-focused) and community keywords is the
    /// primary path; a direct name lookup only runs when the vector search
    /// comes back empty (spec.md §4.G local mode, largest single retrieval
    /// signal).
    async fn retrieve_local(&self, keywords: &Keywords, user_id: &str, top_k: usize) -> Result<RetrievalResult, AppError> {
        let mut names = keywords.low_level.clone();
        names.extend(keywords.community.clone());
        let seeds = self.vector_seed_entities(&names, user_id, top_k).await?;
        self.expand_from_seeds(&seeds, user_id, top_k).await
    }

    /// Theme-centric expansion: vector search over the "relationship"
    /// namespace seeded by high-level keywords and community tags, deriving
    /// entity seeds from the matched edges' endpoints — surfacing entities
    /// that anchor the broader discourse rather than a single mention
    /// (spec.md §4.G global mode).
    async fn retrieve_global(&self, keywords: &Keywords, user_id: &str, top_k: usize) -> Result<RetrievalResult, AppError> {
        let mut names: Vec<String> = keywords.high_level.clone();
        names.extend(keywords.community.clone());

        let query_text = names.join(" ");
        let seeds = if query_text.trim().is_empty() {
            Vec::new()
        } else {
            let embedding = self.llm.embed(&query_text).await?;
            let matches = self.vector.query("relationship", &embedding, top_k).await?;
            let mut seeds = Vec::new();
            for m in matches {
                let Some(edge) = self.graph.get_edge(&m.id).await? else { continue };
                if let Some(src) = self.graph.get_entity(&edge.src).await? {
                    seeds.push((src, Some(m.score)));
                }
                if let Some(tgt) = self.graph.get_entity(&edge.tgt).await? {
                    seeds.push((tgt, Some(m.score)));
                }
            }
            seeds.sort_by(|a, b| a.0.id.cmp(&b.0.id));
            seeds.dedup_by(|a, b| a.0.id == b.0.id);
            seeds
        };

        let seeds = if seeds.is_empty() { self.seed_entities_by_name(&names, user_id).await? } else { seeds };
        self.expand_from_seeds(&seeds, user_id, top_k).await
    }

    /// Union of local and global seeding strategies over the "entity"
    /// namespace with all three keyword tiers, still vector-search-first
    /// (spec.md §4.G hybrid mode).
    async fn retrieve_hybrid(&self, keywords: &Keywords, user_id: &str, top_k: usize) -> Result<RetrievalResult, AppError> {
        let mut names = keywords.low_level.clone();
        names.extend(keywords.high_level.clone());
        names.extend(keywords.community.clone());
        let seeds = self.vector_seed_entities(&names, user_id, top_k).await?;
        self.expand_from_seeds(&seeds, user_id, top_k).await
    }

    /// Hybrid graph expansion plus a naive vector pass over chunks, fused
    /// together — the broadest mode (spec.md §4.G mix mode).
    async fn retrieve_mix(&self, query: &str, keywords: &Keywords, user_id: &str, top_k: usize) -> Result<RetrievalResult, AppError> {
        let graph_result = self.retrieve_hybrid(keywords, user_id, top_k).await?;
        let naive_result = self.retrieve_naive(query, top_k).await?;

        let mut chunks = graph_result.chunks;
        chunks.extend(naive_result.chunks);
        chunks.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        chunks.dedup_by(|a, b| a.chunk_id == b.chunk_id);
        chunks.truncate(top_k);

        Ok(RetrievalResult {
            chunks,
            entities: graph_result.entities,
            relationships: graph_result.relationships,
            multi_hop_paths: graph_result.multi_hop_paths,
        })
    }

    /// Embeds the joined keyword text and searches the "entity" namespace,
    /// falling back to a direct name lookup only when that search yields
    /// nothing (spec.md §4.G).
    async fn vector_seed_entities(&self, names: &[String], user_id: &str, top_k: usize) -> Result<Vec<Seed>, AppError> {
        let query_text = names.join(" ");
        if query_text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let embedding = self.llm.embed(&query_text).await?;
        let matches = self.vector.query("entity", &embedding, top_k).await?;
        let mut seeds = Vec::new();
        for m in matches {
            if let Some(entity) = self.graph.get_entity(&m.id).await? {
                seeds.push((entity, Some(m.score)));
            }
        }
        if seeds.is_empty() {
            return self.seed_entities_by_name(names, user_id).await;
        }
        Ok(seeds)
    }

    /// Direct name-match fallback (spec.md §4.G: used only when vector
    /// search over entity/relation embeddings returns no hits).
    async fn seed_entities_by_name(&self, names: &[String], user_id: &str) -> Result<Vec<Seed>, AppError> {
        let mut seeds = Vec::new();
        for name in names {
            let matches = self.graph.get_entities_by_name(user_id, &common::text::standardize_entity_name(name)).await?;
            seeds.extend(matches.into_iter().map(|e| (e, None)));
        }
        Ok(seeds)
    }

    /// Scores every seed's neighborhood by summed connectivity to the other
    /// seeds (spec.md §4.G: `Σ 1/(shortest_path_length+1)`), fused with
    /// whatever vector score the seed carries, then returns the top-`top_k`
    /// entities plus the relationships and multi-hop paths touching them.
    async fn expand_from_seeds(&self, seeds: &[Seed], _user_id: &str, top_k: usize) -> Result<RetrievalResult, AppError> {
        if seeds.is_empty() {
            return Ok(RetrievalResult::default());
        }

        let seed_entities: Vec<Entity> = seeds.iter().map(|(e, _)| e.clone()).collect();
        let mut candidates: Vec<Entity> = seed_entities.clone();
        for seed in &seed_entities {
            candidates.extend(self.graph.neighbors(&seed.id, top_k * 2).await?);
        }
        candidates.sort_by(|a, b| a.id.cmp(&b.id));
        candidates.dedup_by(|a, b| a.id == b.id);

        let mut scored: Vec<Scored<Entity>> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let mut connectivity = 0.0f32;
            for seed in &seed_entities {
                if let Some(hops) = self.graph.shortest_path_len(&seed.id, &candidate.id, self.max_hops).await? {
                    connectivity += connectivity_score(hops);
                }
            }
            let vector_score = seeds.iter().find(|(e, _)| e.id == candidate.id).and_then(|(_, s)| *s);
            let fused = fuse_scores(&Scores { vector: vector_score, graph: Some(connectivity) }, self.weights);
            let mut entry = Scored::new(candidate).with_graph_score(connectivity);
            if let Some(v) = vector_score {
                entry = entry.with_vector_score(v);
            }
            entry.fused = fused;
            scored.push(entry);
        }

        sort_by_fused_desc(&mut scored);
        scored.truncate(top_k);

        let final_entities: Vec<Entity> = scored.iter().map(|s| s.item.clone()).collect();
        let (relationships, multi_hop_paths) = self.gather_relations_and_paths(&final_entities).await?;

        let entities = scored.into_iter().map(|s| RetrievedEntity { score: s.fused, entity: s.item }).collect();
        Ok(RetrievalResult { chunks: Vec::new(), entities, relationships, multi_hop_paths })
    }

    /// Collects every edge and multi-hop path touching the final entity set
    /// (spec.md §4.G/§4.H: Relationships(KG) and Multi-hop Paths sections).
    async fn gather_relations_and_paths(&self, entities: &[Entity]) -> Result<(Vec<RetrievedEdge>, Vec<MultiHopRelation>), AppError> {
        let mut edges: Vec<Edge> = Vec::new();
        let mut paths: Vec<MultiHopRelation> = Vec::new();
        for entity in entities {
            edges.extend(self.graph.edges_of(&entity.id).await?);
            paths.extend(self.graph.multi_hops_of(&entity.id).await?);
        }
        edges.sort_by(|a, b| a.id.cmp(&b.id));
        edges.dedup_by(|a, b| a.id == b.id);
        paths.sort_by(|a, b| a.id.cmp(&b.id));
        paths.dedup_by(|a, b| a.id == b.id);

        let relationships = edges.into_iter().map(|edge| RetrievedEdge { score: edge.weight, edge }).collect();
        Ok((relationships, paths))
    }
}

/// Truncates assembled context text to `max_tokens`, preferring to drop
/// whole trailing segments over mid-segment cuts (spec.md §4.G/§4.H token
/// budget).
pub fn truncate_to_budget(segments: &[String], tokenizer: &dyn Tokenizer, max_tokens: usize) -> Vec<String> {
    let mut kept = Vec::new();
    let mut used = 0usize;
    for segment in segments {
        let cost = tokenizer.count(segment);
        if used + cost > max_tokens {
            break;
        }
        used += cost;
        kept.push(segment.clone());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::text::WhitespaceTokenizer;

    #[test]
    fn truncate_to_budget_stops_before_overflow() {
        let tokenizer = WhitespaceTokenizer;
        let segments = vec!["one two three".to_string(), "four five six".to_string(), "seven eight nine".to_string()];
        let kept = truncate_to_budget(&segments, &tokenizer, 5);
        assert_eq!(kept.len(), 1);
    }
}
