//! Merge & upsert engine (spec.md §4.E): folds parsed records into the
//! graph store idempotently under a single global lock, so two chunks
//! naming the same entity never race each other into a lost update.

use std::collections::HashSet;
use std::sync::Arc;

use common::{
    error::AppError,
    ids,
    llm::{Geocoder, LlmClient},
    model::{Association, Edge, Entity, MultiHopRelation},
    parsing::Record,
    storage::{GraphStore, VectorStore},
    text::{truncate_vector_content, union_fragments, union_keywords, GRAPH_FIELD_SEP},
};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Toggle-gated merge-time enrichments (spec.md §4.E): both are optional,
/// both fail soft, neither is wired to a concrete backend by default — this
/// core only defines the seam, the way it defines `GraphStore`/`VectorStore`
/// for storage.
#[derive(Clone)]
pub struct MergeConfig {
    /// Fragment count that triggers LLM summarization (spec.md §4.E,
    /// SPEC_FULL.md §9 resolves the default to 6).
    pub force_llm_summary_on_merge: usize,
    /// Rewrites the merged description through an LLM pass before upsert.
    pub description_enrichment: bool,
    /// Looks the entity name up via an external geocoder and appends the
    /// result to the description (spec.md §4.E/§6).
    pub geocoder: Option<Arc<dyn Geocoder>>,
    /// Recomputes communities and rewrites `entity_community` on every
    /// entity touched by a `merge_chunk_records` call, once per call rather
    /// than once per entity (spec.md §4.E post-merge fan-out, Open Question a).
    pub enable_community_detection: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            force_llm_summary_on_merge: 6,
            description_enrichment: false,
            geocoder: None,
            enable_community_detection: false,
        }
    }
}

/// Skip reason for an entity/edge record whose merged invariants don't hold
/// (spec.md §3 entity/edge invariants, §7: "not an error").
fn entity_rejection_reason(entity: &Entity) -> Option<&'static str> {
    if entity.description.trim().is_empty() {
        Some("empty description after merge")
    } else if entity.source_ids.is_empty() && entity.file_path.is_empty() {
        Some("missing both source_id and file_path")
    } else {
        None
    }
}

fn edge_rejection_reason(edge: &Edge) -> Option<&'static str> {
    if edge.description.trim().is_empty() {
        Some("empty description after merge")
    } else if edge.source_ids.is_empty() && edge.file_path.is_empty() {
        Some("missing both source_id and file_path")
    } else {
        None
    }
}

pub struct MergeEngine<G: GraphStore, V: VectorStore> {
    graph: Arc<G>,
    vector: Arc<V>,
    llm: Arc<LlmClient>,
    config: MergeConfig,
    /// Document-scoped merge lock (spec.md §4.E): every merge for a given
    /// document serializes through this mutex so concurrent chunk
    /// extractions for the same document never interleave entity/edge
    /// upserts and lose a description fragment.
    lock: Mutex<()>,
}

impl<G: GraphStore, V: VectorStore> MergeEngine<G, V> {
    pub fn new(graph: Arc<G>, vector: Arc<V>, llm: Arc<LlmClient>, config: MergeConfig) -> Self {
        Self { graph, vector, llm, config, lock: Mutex::new(()) }
    }

    /// Merges every record from one chunk's extraction into the graph.
    /// Records that reference an entity name not seen anywhere in this
    /// batch are still merged — a bare entity stub is created on demand,
    /// the way LightRAG-style pipelines never drop a relationship just
    /// because its endpoint wasn't independently extracted as an entity
    /// record (spec.md §4.E edge cases).
    pub async fn merge_chunk_records(
        &self,
        records: Vec<Record>,
        source_id: &str,
        file_path: &str,
        user_id: &str,
    ) -> Result<MergeSummary, AppError> {
        let _guard = self.lock.lock().await;
        let mut summary = MergeSummary::default();
        let mut touched: HashSet<String> = HashSet::new();

        for record in records {
            match record {
                Record::Entity(e) => {
                    touched.insert(ids::entity_id(&common::text::standardize_entity_name(&e.name)));
                    self.merge_entity(&e.name, &e.entity_type, &e.description, &e.additional_properties, &e.community, source_id, file_path, user_id)
                        .await?;
                    summary.entities += 1;
                }
                Record::Relation(r) => {
                    touched.insert(ids::entity_id(&common::text::standardize_entity_name(&r.source)));
                    touched.insert(ids::entity_id(&common::text::standardize_entity_name(&r.target)));
                    self.merge_edge(&r.source, &r.target, &r.description, &r.keywords, r.strength, source_id, file_path, user_id)
                        .await?;
                    summary.edges += 1;
                }
                Record::MultiHop(mh) => {
                    for name in &mh.path {
                        touched.insert(ids::entity_id(&common::text::standardize_entity_name(name)));
                    }
                    self.merge_multi_hop(mh.path, &mh.description, source_id, file_path, user_id).await?;
                    summary.multi_hops += 1;
                }
                Record::Association(a) => {
                    for name in &a.entities {
                        touched.insert(ids::entity_id(&common::text::standardize_entity_name(name)));
                    }
                    self.merge_association(a.entities, &a.description, source_id, file_path, user_id).await?;
                    summary.associations += 1;
                }
                Record::ContentKeywords(_) => {
                    // Content keywords feed the keyword extractor/cache, not the graph.
                }
            }
        }

        if self.config.enable_community_detection && !touched.is_empty() {
            self.rewrite_entity_communities(&touched, user_id).await?;
        }

        Ok(summary)
    }

    /// Post-merge fan-out (spec.md §4.E): recomputes communities once for
    /// this call and rewrites `entity_community` on every entity touched by
    /// it, rather than paying the O(V+E) community pass per entity.
    async fn rewrite_entity_communities(&self, touched: &HashSet<String>, user_id: &str) -> Result<(), AppError> {
        let communities = self.graph.detect_communities(user_id).await?;
        for id in touched {
            let Some(label) = communities.get(id) else { continue };
            if let Some(mut entity) = self.graph.get_entity(id).await? {
                entity.entity_community = label.to_string();
                self.graph.upsert_entity(entity).await?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn merge_entity(
        &self,
        name: &str,
        entity_type: &str,
        description: &str,
        additional_properties: &str,
        community: &str,
        source_id: &str,
        file_path: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        let id = ids::entity_id(&common::text::standardize_entity_name(name));
        let mut merged = match self.graph.get_entity(&id).await? {
            Some(mut existing) => {
                existing.description = union_fragments(&existing.description, [description]);
                existing.source_ids = union_fragments(&existing.source_ids, [source_id]);
                existing.file_path = union_fragments(&existing.file_path, [file_path]);
                existing.additional_properties = union_fragments(&existing.additional_properties, [additional_properties]);
                existing.entity_community = union_fragments(&existing.entity_community, [community]);
                existing.updated_at = chrono::Utc::now();
                if existing.entity_type.is_empty() {
                    existing.entity_type = entity_type.to_string();
                }
                self.maybe_summarize_description(&mut existing.description, name).await?;
                existing
            }
            None => {
                let mut entity = Entity::new(
                    name.to_string(),
                    entity_type.to_string(),
                    description.to_string(),
                    source_id.to_string(),
                    file_path.to_string(),
                    user_id.to_string(),
                );
                entity.additional_properties = additional_properties.to_string();
                entity.entity_community = community.to_string();
                entity
            }
        };
        self.enrich_description(&mut merged).await;

        if let Some(reason) = entity_rejection_reason(&merged) {
            warn!(entity = %merged.name, reason, "skipping entity merge");
            return Ok(());
        }

        self.index_entity(&merged).await?;
        self.graph.upsert_entity(merged).await
    }

    /// Optional description-enrichment LLM pass and geocoder enrichment
    /// (spec.md §4.E), both toggle-gated and fail soft — a failed geocoder
    /// lookup or enrichment call leaves the description as-is rather than
    /// aborting the merge (spec.md §7).
    async fn enrich_description(&self, entity: &mut Entity) {
        if self.config.description_enrichment {
            let system = "Rewrite the following entity description to be clearer and more concise without losing any factual content. Respond with the rewritten description only.";
            match self.llm.complete(system, &entity.description).await {
                Ok(rewritten) => entity.description = rewritten.trim().to_string(),
                Err(err) => warn!(entity = %entity.name, error = %err, "description enrichment failed, leaving description unenriched"),
            }
        }

        if let Some(geocoder) = &self.config.geocoder {
            match geocoder.lookup(&entity.name).await {
                Ok(geo) => {
                    entity.description = union_fragments(
                        &entity.description,
                        [&format!(
                            "{}, {} ({}) lat={} lon={}",
                            geo.commune, geo.pays, geo.region, geo.latitude, geo.longitude
                        )],
                    );
                }
                Err(err) => warn!(entity = %entity.name, error = %err, "geocoder lookup failed, description stays unenriched"),
            }
        }
    }

    /// Embeds and indexes an entity's name+description so vector search can
    /// surface it directly (spec.md §4.G primary retrieval signal).
    async fn index_entity(&self, entity: &Entity) -> Result<(), AppError> {
        let embedding = self.llm.embed(&format!("{}: {}", entity.name, entity.description)).await?;
        let content = truncate_vector_content(&entity.description);
        self.vector.upsert("entity", &entity.id, embedding, content).await
    }

    async fn index_edge(&self, edge: &Edge) -> Result<(), AppError> {
        let embedding = self.llm.embed(&format!("{} -> {}: {}", edge.src, edge.tgt, edge.description)).await?;
        let content = truncate_vector_content(&edge.description);
        self.vector.upsert("relationship", &edge.id, embedding, content).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn merge_edge(
        &self,
        src_name: &str,
        tgt_name: &str,
        description: &str,
        keywords: &str,
        weight: f32,
        source_id: &str,
        file_path: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        let src_id = ids::entity_id(&common::text::standardize_entity_name(src_name));
        let tgt_id = ids::entity_id(&common::text::standardize_entity_name(tgt_name));
        if src_id == tgt_id {
            warn!(entity = %src_name, "skipping self-loop edge");
            return Ok(());
        }

        // Ensure both endpoints exist as at least a bare entity stub.
        self.ensure_entity_stub(src_name, source_id, file_path, user_id).await?;
        self.ensure_entity_stub(tgt_name, source_id, file_path, user_id).await?;

        let edge_key_id = common::model::EdgeKey::new(&src_id, &tgt_id).id();

        let merged = match self.graph.get_edge(&edge_key_id).await? {
            Some(mut existing) => {
                existing.description = union_fragments(&existing.description, [description]);
                existing.keywords = union_keywords(&existing.keywords, [keywords]);
                existing.source_ids = union_fragments(&existing.source_ids, [source_id]);
                existing.file_path = union_fragments(&existing.file_path, [file_path]);
                existing.weight += weight;
                existing.updated_at = chrono::Utc::now();
                self.maybe_summarize_description(&mut existing.description, &format!("{src_name}-{tgt_name}")).await?;
                existing
            }
            None => Edge::new(
                &src_id,
                &tgt_id,
                description.to_string(),
                keywords.to_string(),
                weight,
                source_id.to_string(),
                file_path.to_string(),
                user_id.to_string(),
            ),
        };

        if let Some(reason) = edge_rejection_reason(&merged) {
            warn!(edge = %merged.id, reason, "skipping edge merge");
            return Ok(());
        }

        self.index_edge(&merged).await?;
        self.graph.upsert_edge(merged).await
    }

    async fn merge_multi_hop(&self, path: Vec<String>, description: &str, source_id: &str, file_path: &str, user_id: &str) -> Result<(), AppError> {
        for name in &path {
            self.ensure_entity_stub(name, source_id, file_path, user_id).await?;
        }
        let ids: Vec<String> = path.iter().map(|n| ids::entity_id(&common::text::standardize_entity_name(n))).collect();
        let key = ids::multi_hop_id(&ids);

        let merged = match self.find_multi_hop(&key, &ids).await? {
            Some(mut existing) => {
                existing.description = union_fragments(&existing.description, [description]);
                existing.source_ids = union_fragments(&existing.source_ids, [source_id]);
                existing.updated_at = chrono::Utc::now();
                existing
            }
            None => MultiHopRelation::new(ids, description.to_string(), source_id.to_string(), user_id.to_string()),
        };
        self.graph.upsert_multi_hop(merged).await
    }

    async fn find_multi_hop(&self, key: &str, path: &[String]) -> Result<Option<MultiHopRelation>, AppError> {
        let Some(first) = path.first() else { return Ok(None) };
        for mh in self.graph.multi_hops_of(first).await? {
            if mh.id == key {
                return Ok(Some(mh));
            }
        }
        Ok(None)
    }

    async fn merge_association(&self, entities: Vec<String>, description: &str, source_id: &str, file_path: &str, user_id: &str) -> Result<(), AppError> {
        for name in &entities {
            self.ensure_entity_stub(name, source_id, file_path, user_id).await?;
        }
        let mut ids: Vec<String> = entities.iter().map(|n| ids::entity_id(&common::text::standardize_entity_name(n))).collect();
        ids.sort();
        let key = ids::association_id(&ids);

        let merged = match self.find_association(&key, &ids).await? {
            Some(mut existing) => {
                existing.description = union_fragments(&existing.description, [description]);
                existing.source_ids = union_fragments(&existing.source_ids, [source_id]);
                existing.updated_at = chrono::Utc::now();
                existing
            }
            None => Association::new(ids, description.to_string(), source_id.to_string(), user_id.to_string()),
        };
        self.graph.upsert_association(merged).await
    }

    async fn find_association(&self, key: &str, entity_ids: &[String]) -> Result<Option<Association>, AppError> {
        let Some(first) = entity_ids.first() else { return Ok(None) };
        for assoc in self.graph.associations_of(first).await? {
            if assoc.id == key {
                return Ok(Some(assoc));
            }
        }
        Ok(None)
    }

    /// Auto-creates a bare endpoint stub so an edge/multi-hop/association
    /// never dangles on an entity that wasn't independently extracted
    /// (spec.md §4.E edge record invariant: "endpoints must exist in the
    /// graph (auto-created if missing and chunk linkage is available)").
    /// Deliberately not subject to [`entity_rejection_reason`] — an empty
    /// description is exactly what marks a stub as not yet independently
    /// observed, and it always carries a non-empty `source_id`.
    async fn ensure_entity_stub(&self, name: &str, source_id: &str, file_path: &str, user_id: &str) -> Result<(), AppError> {
        let standardized = common::text::standardize_entity_name(name);
        let id = ids::entity_id(&standardized);
        if self.graph.get_entity(&id).await?.is_none() {
            self.graph
                .upsert_entity(Entity::new(
                    name.to_string(),
                    "unknown".to_string(),
                    String::new(),
                    source_id.to_string(),
                    file_path.to_string(),
                    user_id.to_string(),
                ))
                .await?;
        }
        Ok(())
    }

    /// Compresses a `<SEP>`-joined description once it accumulates more
    /// than `config.force_llm_summary_on_merge` fragments (spec.md §4.E).
    async fn maybe_summarize_description(&self, description: &mut String, subject: &str) -> Result<(), AppError> {
        let fragment_count = description.split(GRAPH_FIELD_SEP).filter(|s| !s.is_empty()).count();
        if fragment_count <= self.config.force_llm_summary_on_merge {
            return Ok(());
        }
        info!(subject, fragment_count, "summarizing description on merge overflow");
        let system = "You merge multiple partial descriptions of the same entity or relationship into one concise, non-redundant description. Respond with the description only.";
        let user = format!("Subject: {subject}\n\nFragments:\n{}", description.replace(GRAPH_FIELD_SEP, "\n- "));
        let summary = self.llm.complete(system, &user).await?;
        *description = summary.trim().to_string();
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MergeSummary {
    pub entities: usize,
    pub edges: usize,
    pub multi_hops: usize,
    pub associations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{
        model::GeoResult,
        storage::{InMemoryGraph, InMemoryVector},
    };

    fn llm() -> Arc<LlmClient> {
        Arc::new(LlmClient::new("test-key", "https://api.openai.com/v1", "gpt-4o-mini".into(), "text-embedding-3-small".into(), 1536))
    }

    fn engine(graph: Arc<InMemoryGraph>, config: MergeConfig) -> MergeEngine<InMemoryGraph, InMemoryVector> {
        MergeEngine::new(graph, Arc::new(InMemoryVector::default()), llm(), config)
    }

    struct FakeGeocoder;

    #[async_trait::async_trait]
    impl Geocoder for FakeGeocoder {
        async fn lookup(&self, _place_name: &str) -> Result<GeoResult, AppError> {
            Ok(GeoResult {
                lieu: "Eiffel Tower".into(),
                pays: "France".into(),
                code_pays: "FR".into(),
                region: "Ile-de-France".into(),
                province: String::new(),
                departement: "Paris".into(),
                commune: "Paris".into(),
                latitude: 48.8584,
                longitude: 2.2945,
                osm_type: "node".into(),
                importance: 0.9,
            })
        }
    }

    #[tokio::test]
    async fn merge_entity_unions_description_fragments() {
        let graph = Arc::new(InMemoryGraph::default());
        let engine = engine(graph.clone(), MergeConfig::default());

        engine.merge_entity("Alex", "person", "Alex is frustrated.", "", "", "chunk-1", "", "u1").await.unwrap();
        engine.merge_entity("Alex", "person", "Alex calms down.", "", "", "chunk-2", "", "u1").await.unwrap();

        let id = ids::entity_id("ALEX");
        let entity = graph.get_entity(&id).await.unwrap().expect("entity should exist");
        assert!(entity.description.contains("frustrated"));
        assert!(entity.description.contains("calms down"));
        assert!(entity.source_ids.contains("chunk-1"));
        assert!(entity.source_ids.contains("chunk-2"));
    }

    #[tokio::test]
    async fn merge_entity_unions_additional_properties_and_community() {
        let graph = Arc::new(InMemoryGraph::default());
        let engine = engine(graph.clone(), MergeConfig::default());

        engine.merge_entity("Alex", "person", "desc", "mood:tense", "workplace drama", "chunk-1", "", "u1").await.unwrap();
        engine.merge_entity("Alex", "person", "desc", "age:34", "office politics", "chunk-2", "", "u1").await.unwrap();

        let entity = graph.get_entity(&ids::entity_id("ALEX")).await.unwrap().expect("entity should exist");
        assert!(entity.additional_properties.contains("mood:tense"));
        assert!(entity.additional_properties.contains("age:34"));
        assert!(entity.entity_community.contains("workplace drama"));
        assert!(entity.entity_community.contains("office politics"));
    }

    #[tokio::test]
    async fn merge_edge_creates_stub_endpoints() {
        let graph = Arc::new(InMemoryGraph::default());
        let engine = engine(graph.clone(), MergeConfig::default());

        engine.merge_edge("Alex", "Taylor", "Alex observes Taylor.", "power dynamics", 7.0, "chunk-1", "", "u1").await.unwrap();

        assert!(graph.get_entity(&ids::entity_id("ALEX")).await.unwrap().is_some());
        assert!(graph.get_entity(&ids::entity_id("TAYLOR")).await.unwrap().is_some());
        let edge_id = common::model::EdgeKey::new(&ids::entity_id("ALEX"), &ids::entity_id("TAYLOR")).id();
        assert!(graph.get_edge(&edge_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn merge_edge_sums_weight_on_duplicate_ingest() {
        let graph = Arc::new(InMemoryGraph::default());
        let engine = engine(graph.clone(), MergeConfig::default());

        engine.merge_edge("Alex", "Taylor", "Alex observes Taylor.", "power dynamics", 1.0, "chunk-1", "", "u1").await.unwrap();
        engine.merge_edge("Alex", "Taylor", "Alex observes Taylor again.", "power dynamics", 1.0, "chunk-2", "", "u1").await.unwrap();

        let edge_id = common::model::EdgeKey::new(&ids::entity_id("ALEX"), &ids::entity_id("TAYLOR")).id();
        let edge = graph.get_edge(&edge_id).await.unwrap().expect("edge should exist");
        assert_eq!(edge.weight, 2.0, "duplicate ingest should sum weight, not take the max");
    }

    #[tokio::test]
    async fn merge_edge_rejects_self_loop() {
        let graph = Arc::new(InMemoryGraph::default());
        let engine = engine(graph.clone(), MergeConfig::default());

        engine.merge_edge("Alex", "Alex", "self reference", "identity", 1.0, "chunk-1", "", "u1").await.unwrap();

        let edge_id = common::model::EdgeKey::new(&ids::entity_id("ALEX"), &ids::entity_id("ALEX")).id();
        assert!(graph.get_edge(&edge_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_entity_rejects_when_description_empty_and_no_source() {
        let graph = Arc::new(InMemoryGraph::default());
        let engine = engine(graph.clone(), MergeConfig::default());

        engine.merge_entity("Ghost", "person", "", "", "", "", "", "u1").await.unwrap();

        assert!(graph.get_entity(&ids::entity_id("GHOST")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_is_append_idempotent_on_description() {
        let graph = Arc::new(InMemoryGraph::default());
        let engine = engine(graph.clone(), MergeConfig::default());

        engine.merge_entity("Alex", "person", "Alex is frustrated.", "", "", "chunk-1", "", "u1").await.unwrap();
        engine.merge_entity("Alex", "person", "Alex is frustrated.", "", "", "chunk-1", "", "u1").await.unwrap();

        let entity = graph.get_entity(&ids::entity_id("ALEX")).await.unwrap().expect("entity should exist");
        assert_eq!(entity.description, "Alex is frustrated.", "re-ingesting the same fragment should not duplicate it");
        assert_eq!(entity.source_ids, "chunk-1");
    }

    #[tokio::test]
    async fn merge_association_is_order_independent() {
        let graph = Arc::new(InMemoryGraph::default());
        let engine = engine(graph.clone(), MergeConfig::default());

        engine
            .merge_association(vec!["Alex".into(), "Taylor".into(), "Jordan".into()], "shared interest".into(), "chunk-1", "", "u1")
            .await
            .unwrap();
        engine
            .merge_association(vec!["Jordan".into(), "Alex".into(), "Taylor".into()], "confirmed again".into(), "chunk-2", "", "u1")
            .await
            .unwrap();

        let alex_id = ids::entity_id("ALEX");
        let associations = graph.associations_of(&alex_id).await.unwrap();
        assert_eq!(associations.len(), 1, "same entity set in any order should merge to one association");
        assert!(associations[0].description.contains("shared interest"));
        assert!(associations[0].description.contains("confirmed again"));
    }

    #[tokio::test]
    async fn geocoder_enrichment_appends_to_description_when_enabled() {
        let graph = Arc::new(InMemoryGraph::default());
        let config = MergeConfig { geocoder: Some(Arc::new(FakeGeocoder)), ..MergeConfig::default() };
        let engine = engine(graph.clone(), config);

        engine.merge_entity("Paris", "location", "Capital of France.", "", "", "chunk-1", "", "u1").await.unwrap();

        let entity = graph.get_entity(&ids::entity_id("PARIS")).await.unwrap().expect("entity should exist");
        assert!(entity.description.contains("Capital of France"));
        assert!(entity.description.contains("lat=48.8584"));
    }

    #[tokio::test]
    async fn community_detection_rewrites_entity_community_when_enabled() {
        let graph = Arc::new(InMemoryGraph::default());
        let config = MergeConfig { enable_community_detection: true, ..MergeConfig::default() };
        let engine = engine(graph.clone(), config);

        engine
            .merge_chunk_records(
                vec![common::parsing::Record::Relation(common::parsing::RelationRecord {
                    source: "Alex".into(),
                    target: "Taylor".into(),
                    description: "knows".into(),
                    keywords: "friendship".into(),
                    strength: 1.0,
                    latent: false,
                })],
                "chunk-1",
                "",
                "u1",
            )
            .await
            .unwrap();

        let alex = graph.get_entity(&ids::entity_id("ALEX")).await.unwrap().expect("entity should exist");
        assert!(!alex.entity_community.is_empty(), "entity_community should be rewritten once detection is enabled");
    }

    #[tokio::test]
    async fn no_community_detection_by_default() {
        let graph = Arc::new(InMemoryGraph::default());
        let engine = engine(graph.clone(), MergeConfig::default());

        engine.merge_entity("Alex", "person", "Alex is here.", "", "", "chunk-1", "", "u1").await.unwrap();

        let alex = graph.get_entity(&ids::entity_id("ALEX")).await.unwrap().expect("entity should exist");
        assert!(alex.entity_community.is_empty());
    }

    #[tokio::test]
    async fn no_enrichment_by_default() {
        let graph = Arc::new(InMemoryGraph::default());
        let engine = engine(graph.clone(), MergeConfig::default());

        engine.merge_entity("Paris", "location", "Capital of France.", "", "", "chunk-1", "", "u1").await.unwrap();

        let entity = graph.get_entity(&ids::entity_id("PARIS")).await.unwrap().expect("entity should exist");
        assert_eq!(entity.description, "Capital of France.");
    }
}
