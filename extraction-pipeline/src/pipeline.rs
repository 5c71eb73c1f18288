//! Extraction pipeline orchestration (spec.md §4.D): chunks a document,
//! fans out bounded-concurrency LLM extraction per chunk, and folds every
//! chunk's records into the graph as each extraction completes.

use std::sync::Arc;

use common::{
    chunking::{chunk_document, ChunkerConfig},
    error::AppError,
    llm::LlmClient,
    model::TextChunk,
    pipeline_status::{DocumentStage, PipelineStatus},
    storage::{GraphStore, KvStore, VectorStore},
    text::WhitespaceTokenizer,
};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{error, info, instrument};

use crate::{
    extractor::{extract_chunk, ExtractorConfig},
    merge::{MergeConfig, MergeEngine},
};

pub struct ExtractionPipeline<G: GraphStore, K: KvStore, V: VectorStore> {
    graph: Arc<G>,
    kv: Arc<K>,
    vector: Arc<V>,
    llm: Arc<LlmClient>,
    merge: Arc<MergeEngine<G, V>>,
    chunker_config: ChunkerConfig,
    extractor_config: ExtractorConfig,
    /// Caps concurrent extraction tasks per document (spec.md §4.D): a
    /// `Semaphore` permit is held for the duration of one chunk's LLM
    /// round-trip rather than gating submission, so the `JoinSet` can still
    /// enqueue every chunk up front.
    concurrency: usize,
}

impl<G, K, V> ExtractionPipeline<G, K, V>
where
    G: GraphStore + 'static,
    K: KvStore + 'static,
    V: VectorStore + 'static,
{
    pub fn new(
        graph: Arc<G>,
        kv: Arc<K>,
        vector: Arc<V>,
        llm: Arc<LlmClient>,
        chunker_config: ChunkerConfig,
        extractor_config: ExtractorConfig,
        merge_config: MergeConfig,
        concurrency: usize,
    ) -> Self {
        let merge = Arc::new(MergeEngine::new(graph.clone(), vector.clone(), llm.clone(), merge_config));
        Self { graph, kv, vector, llm, merge, chunker_config, extractor_config, concurrency }
    }

    /// Chunks `content`, extracts and merges every chunk, and returns the
    /// final status. A failure in any one chunk's extraction aborts every
    /// still-running task for this document (spec.md §4.D: first-exception
    /// cancellation, not partial-result tolerance) — a document is either
    /// fully extracted or fully failed.
    #[instrument(level = "info", skip_all, fields(document_id = %document_id))]
    pub async fn process_document(&self, document_id: &str, content: &str, file_path: &str, user_id: &str) -> Result<PipelineStatus, AppError> {
        let mut status = PipelineStatus::queued(document_id);
        status.advance(DocumentStage::Chunking);

        let tokenizer = WhitespaceTokenizer;
        let chunks = chunk_document(content, &tokenizer, &self.chunker_config);
        status.chunks_total = chunks.len();
        if chunks.is_empty() {
            status.advance(DocumentStage::Completed);
            return Ok(status);
        }

        status.advance(DocumentStage::Extracting);
        let semaphore = Arc::new(Semaphore::new(self.concurrency.max(1)));
        let mut join_set = JoinSet::new();
        for chunk in chunks {
            let text_chunk =
                TextChunk::new(document_id.to_string(), chunk.order, chunk.content, chunk.token_count, user_id.to_string(), file_path.to_string());
            let llm = self.llm.clone();
            let extractor_config = self.extractor_config.clone();
            let permit_source = semaphore.clone();
            join_set.spawn(async move {
                let _permit = permit_source.acquire_owned().await.map_err(|e| AppError::Internal(format!("semaphore closed: {e}")))?;
                let records = extract_chunk(&llm, &text_chunk, &extractor_config).await?;
                Ok::<_, AppError>((text_chunk, records))
            });
        }

        let mut extracted_chunks = 0usize;
        let mut merged_records = 0usize;
        while let Some(joined) = join_set.join_next().await {
            let outcome = match joined {
                Ok(inner) => inner,
                Err(join_err) => {
                    join_set.abort_all();
                    return Err(AppError::Join(join_err));
                }
            };
            match outcome {
                Ok((text_chunk, records)) => {
                    self.vector_upsert_chunk(&text_chunk).await?;
                    status.advance(DocumentStage::Merging);
                    let summary = self.merge.merge_chunk_records(records, &text_chunk.id, file_path, user_id).await?;
                    merged_records += summary.entities + summary.edges + summary.multi_hops + summary.associations;
                    extracted_chunks += 1;
                    status.chunks_extracted = extracted_chunks;
                    status.records_merged = merged_records;
                }
                Err(err) => {
                    error!(error = %err, "chunk extraction failed, aborting remaining tasks");
                    join_set.abort_all();
                    status.fail(err.to_string());
                    return Ok(status);
                }
            }
        }

        status.advance(DocumentStage::Completed);
        info!(chunks = status.chunks_total, records = status.records_merged, "document extraction completed");
        Ok(status)
    }

    async fn vector_upsert_chunk(&self, chunk: &TextChunk) -> Result<(), AppError> {
        let embedding = self.llm.embed(&chunk.content).await?;
        let content = common::text::truncate_vector_content(&chunk.content);
        self.vector.upsert("text_chunk", &chunk.id, embedding.clone(), content).await?;
        let serialized = serde_json::to_string(chunk).map_err(|e| AppError::Internal(format!("chunk serialize failed: {e}")))?;
        self.kv.put("text_chunk", &chunk.id, serialized).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::storage::{InMemoryGraph, InMemoryKv, InMemoryVector};

    fn pipeline() -> ExtractionPipeline<InMemoryGraph, InMemoryKv, InMemoryVector> {
        let llm = Arc::new(LlmClient::new("test-key", "https://api.openai.com/v1", "gpt-4o-mini".into(), "text-embedding-3-small".into(), 1536));
        ExtractionPipeline::new(
            Arc::new(InMemoryGraph::default()),
            Arc::new(InMemoryKv::default()),
            Arc::new(InMemoryVector::default()),
            llm,
            ChunkerConfig::default(),
            ExtractorConfig::default(),
            MergeConfig::default(),
            4,
        )
    }

    #[tokio::test]
    async fn empty_document_completes_without_extraction() {
        let pipeline = pipeline();
        let status = pipeline.process_document("doc-1", "", "", "u1").await.unwrap();
        assert_eq!(status.chunks_total, 0);
        assert_eq!(status.stage, DocumentStage::Completed);
    }
}
