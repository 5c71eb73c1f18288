//! Query router and prompt assembler (spec.md §4.H): turns a
//! [`QueryRequest`] into a final answer by extracting keywords, retrieving
//! context via the [`RetrievalEngine`], assembling a token-budgeted
//! prompt, and completing it with the style-appropriate system prompt.

use std::sync::Arc;

use common::{
    error::AppError,
    llm::LlmClient,
    model::{QueryMode, QueryRequest, ResponseStyle},
    prompts::{
        ANALYST_RESPONSE_SYSTEM_PROMPT, BYPASS_SYSTEM_PROMPT, FAIL_RESPONSE, NAIVE_RAG_RESPONSE_SYSTEM_PROMPT,
        RAG_RESPONSE_SYSTEM_PROMPT,
    },
    storage::{GraphStore, KvStore, VectorStore},
    text::WhitespaceTokenizer,
};
use tracing::instrument;

use crate::{
    cache::ResponseCache,
    engine::{truncate_to_budget, RetrievalEngine},
    keywords::extract_keywords,
};

const CACHE_TYPE_QUERY: &str = "query";

pub struct QueryRouter<G: GraphStore, K: KvStore, V: VectorStore> {
    engine: RetrievalEngine<G, K, V>,
    cache: ResponseCache<K>,
    llm: Arc<LlmClient>,
    max_context_tokens: usize,
    enable_cache: bool,
}

impl<G: GraphStore, K: KvStore, V: VectorStore> QueryRouter<G, K, V> {
    pub fn new(
        graph: Arc<G>,
        kv: Arc<K>,
        vector: Arc<V>,
        llm: Arc<LlmClient>,
        max_context_tokens: usize,
        enable_cache: bool,
    ) -> Self {
        Self {
            engine: RetrievalEngine::new(graph, kv.clone(), vector, llm.clone()),
            cache: ResponseCache::new(kv),
            llm,
            max_context_tokens,
            enable_cache,
        }
    }

    #[instrument(level = "info", skip_all, fields(mode = ?request.mode, style = ?request.style))]
    pub async fn answer(&self, request: &QueryRequest) -> Result<String, AppError> {
        if request.mode == QueryMode::Bypass {
            return self.answer_bypass(request).await;
        }

        let mode_key = format!("{:?}", request.mode).to_lowercase();
        let cache_input = format!("{}|{}", request.conversation_history.join("\n"), request.query);
        if self.enable_cache {
            if let Some(entry) = self.cache.get(&mode_key, &cache_input, CACHE_TYPE_QUERY).await? {
                return Ok(entry.response);
            }
        }

        let keywords = extract_keywords(&self.llm, &self.cache, &request.query, &request.conversation_history).await?;
        let retrieved = self.engine.retrieve(&request.query, request.mode, &keywords, &request.user_id, 20).await?;

        if retrieved.chunks.is_empty() && retrieved.entities.is_empty() {
            return Ok(FAIL_RESPONSE.to_string());
        }

        let mut segments: Vec<String> = Vec::new();
        for entity in &retrieved.entities {
            segments.push(format!(
                "[KG:Entity] {} ({}): {}",
                entity.entity.name, entity.entity.entity_type, entity.entity.description
            ));
        }
        for edge in &retrieved.relationships {
            segments.push(format!("[KG:Relationship] {} <-> {}: {}", edge.edge.src, edge.edge.tgt, edge.edge.description));
        }
        for path in &retrieved.multi_hop_paths {
            segments.push(format!("[KG:MultiHop] {}: {}", path.path.join(" -> "), path.description));
        }
        for chunk in &retrieved.chunks {
            segments.push(format!("[DC] {}: {}", chunk.chunk_id, chunk.content));
        }

        let tokenizer = WhitespaceTokenizer;
        let context_segments = truncate_to_budget(&segments, &tokenizer, self.max_context_tokens);
        let context_data = context_segments.join("\n\n");
        let history = request.conversation_history.join("\n");

        let system = self.system_prompt(request.mode, request.style);
        let user = format!("---Conversation History---\n{history}\n\n---Knowledge Graph and Document Chunks---\n{context_data}\n\nQuery: {}", request.query);

        let response = self.llm.complete(&system, &user).await?;

        if self.enable_cache {
            self.cache.put(&mode_key, &cache_input, CACHE_TYPE_QUERY, response.clone(), false).await?;
        }

        Ok(response)
    }

    /// Bypass mode (spec.md §3, SPEC_FULL.md §4.H): no retrieval, the query
    /// and history go straight to the LLM and its response is returned
    /// verbatim.
    async fn answer_bypass(&self, request: &QueryRequest) -> Result<String, AppError> {
        let history = request.conversation_history.join("\n");
        let user = format!("---Conversation History---\n{history}\n\nQuery: {}", request.query);
        self.llm.complete(BYPASS_SYSTEM_PROMPT, &user).await
    }

    fn system_prompt(&self, mode: QueryMode, style: ResponseStyle) -> String {
        match style {
            ResponseStyle::Analyst => ANALYST_RESPONSE_SYSTEM_PROMPT.to_string(),
            ResponseStyle::Standard if mode == QueryMode::Naive => NAIVE_RAG_RESPONSE_SYSTEM_PROMPT.to_string(),
            ResponseStyle::Standard => RAG_RESPONSE_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyst_style_overrides_mode_prompt() {
        let router_prompt = |mode, style| -> &'static str {
            match style {
                ResponseStyle::Analyst => ANALYST_RESPONSE_SYSTEM_PROMPT,
                ResponseStyle::Standard if matches!(mode, QueryMode::Naive) => NAIVE_RAG_RESPONSE_SYSTEM_PROMPT,
                ResponseStyle::Standard => RAG_RESPONSE_SYSTEM_PROMPT,
            }
        };
        assert_eq!(router_prompt(QueryMode::Naive, ResponseStyle::Analyst), ANALYST_RESPONSE_SYSTEM_PROMPT);
        assert_eq!(router_prompt(QueryMode::Naive, ResponseStyle::Standard), NAIVE_RAG_RESPONSE_SYSTEM_PROMPT);
        assert_eq!(router_prompt(QueryMode::Hybrid, ResponseStyle::Standard), RAG_RESPONSE_SYSTEM_PROMPT);
    }
}
