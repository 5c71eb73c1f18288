use std::sync::Arc;
use std::time::Duration;

use common::{
    config::get_config,
    error::AppError,
    llm::LlmClient,
    model::QueryRequest,
    storage::{GraphStore, InMemoryGraph, InMemoryKv, InMemoryVector, KvStore, VectorStore},
};
use deepsearch::{DeepSearchConfig, DeepSearchController};
use extraction_pipeline::{ExtractionPipeline, ExtractorConfig};
use retrieval_pipeline::QueryRouter;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DOCUMENT_QUEUE_NAMESPACE: &str = "document_queue";
const QUERY_QUEUE_NAMESPACE: &str = "query_queue";
const QUERY_RESPONSE_NAMESPACE: &str = "query_responses";
const IDLE_BACKOFF: Duration = Duration::from_millis(500);
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// A pending extraction job, enqueued by an external collaborator (spec.md
/// §1: ingestion of raw documents is out of scope for this core) and popped
/// by this worker loop.
#[derive(Debug, Serialize, Deserialize)]
struct DocumentJob {
    document_id: String,
    user_id: String,
    content: String,
    #[serde(default)]
    file_path: String,
}

/// A pending query job. `deep` routes the request to the tree-of-thought
/// controller instead of the regular prompt assembler/query router.
#[derive(Debug, Serialize, Deserialize)]
struct QueryJob {
    request_id: String,
    request: QueryRequest,
    #[serde(default)]
    deep: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let config = get_config()?;

    let graph = Arc::new(InMemoryGraph::default());
    let kv = Arc::new(InMemoryKv::default());
    let vector = Arc::new(InMemoryVector::default());
    let llm = Arc::new(LlmClient::with_timeout(
        &config.openai_api_key,
        &config.openai_base_url,
        config.chat_model.clone(),
        config.embedding_model.clone(),
        config.embedding_dimensions,
        config.llm_timeout_secs,
    ));

    if config.enable_geocoding {
        warn!("enable_geocoding is set but no geocoder backend is wired into this worker binary; proceeding without geo enrichment");
    }

    let extractor_config = ExtractorConfig { gleaning_max_rounds: config.gleaning_max_rounds, ..ExtractorConfig::default() };
    let merge_config = extraction_pipeline::MergeConfig {
        force_llm_summary_on_merge: config.force_llm_summary_on_merge,
        description_enrichment: config.enable_description_enrichment,
        // No concrete geocoder backend ships with this core (spec.md §1
        // external collaborators); set to `Some(...)` once one is wired in.
        geocoder: None,
        enable_community_detection: config.enable_community_detection,
    };
    let extraction_pipeline = ExtractionPipeline::new(
        graph.clone(),
        kv.clone(),
        vector.clone(),
        llm.clone(),
        common::chunking::ChunkerConfig::default(),
        extractor_config,
        merge_config,
        config.extraction_concurrency,
    );

    let router = Arc::new(QueryRouter::new(
        graph.clone(),
        kv.clone(),
        vector.clone(),
        llm.clone(),
        config.max_context_tokens,
        config.enable_llm_cache,
    ));
    let deepsearch = DeepSearchController::new(
        router.clone(),
        llm.clone(),
        DeepSearchConfig {
            max_concurrent_branches: config.extraction_concurrency,
            working_dir: config.data_dir.clone().into(),
            max_depth_cap: config.deepsearch_max_depth,
        },
    );

    info!("starting worker loop (extraction + query + deep-search)");
    run_worker_loop(kv, extraction_pipeline, router, deepsearch).await
}

/// Polls the document and query job queues in turn, processing whichever
/// has work (teacher's `claim-next-ready` loop, adapted to the abstract
/// `KvStore` since this core has no concrete, distributed job queue of its
/// own — spec.md §1 names job persistence an external collaborator).
async fn run_worker_loop<G, K, V>(
    kv: Arc<K>,
    extraction: ExtractionPipeline<G, K, V>,
    router: Arc<QueryRouter<G, K, V>>,
    deepsearch: DeepSearchController<G, K, V>,
) -> Result<(), Box<dyn std::error::Error>>
where
    G: GraphStore + 'static,
    K: KvStore + 'static,
    V: VectorStore + 'static,
{
    loop {
        match claim_next_document_job(&kv).await {
            Ok(Some(job)) => {
                info!(document_id = %job.document_id, "claimed document extraction job");
                match extraction.process_document(&job.document_id, &job.content, &job.file_path, &job.user_id).await {
                    Ok(status) => info!(document_id = %job.document_id, stage = ?status.stage, "document processed"),
                    Err(err) => error!(document_id = %job.document_id, error = %err, "document extraction failed"),
                }
                continue;
            }
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "failed to claim next document job");
                warn!("backing off after claim error");
                sleep(ERROR_BACKOFF).await;
                continue;
            }
        }

        match claim_next_query_job(&kv).await {
            Ok(Some(job)) => {
                info!(request_id = %job.request_id, deep = job.deep, "claimed query job");
                let outcome = if job.deep {
                    let epoch_seconds = chrono::Utc::now().timestamp().max(0) as u64;
                    deepsearch
                        .run(&job.request.query, &job.request.user_id, epoch_seconds)
                        .await
                        .map(|path| path.to_string_lossy().into_owned())
                } else {
                    router.answer(&job.request).await
                };
                match outcome {
                    Ok(answer) => {
                        if let Err(err) = kv.put(QUERY_RESPONSE_NAMESPACE, &job.request_id, answer).await {
                            error!(request_id = %job.request_id, error = %err, "failed to store query response");
                        }
                    }
                    Err(err) => error!(request_id = %job.request_id, error = %err, "query job failed"),
                }
            }
            Ok(None) => sleep(IDLE_BACKOFF).await,
            Err(err) => {
                error!(error = %err, "failed to claim next query job");
                warn!("backing off after claim error");
                sleep(ERROR_BACKOFF).await;
            }
        }
    }
}

async fn claim_next_document_job<K: KvStore>(kv: &K) -> Result<Option<DocumentJob>, AppError> {
    let Some((key, raw)) = kv.scan_prefix(DOCUMENT_QUEUE_NAMESPACE, "").await?.into_iter().next() else {
        return Ok(None);
    };
    kv.delete(DOCUMENT_QUEUE_NAMESPACE, &key).await?;
    let job: DocumentJob = serde_json::from_str(&raw).map_err(|e| AppError::Parsing(format!("document job: {e}")))?;
    Ok(Some(job))
}

async fn claim_next_query_job<K: KvStore>(kv: &K) -> Result<Option<QueryJob>, AppError> {
    let Some((key, raw)) = kv.scan_prefix(QUERY_QUEUE_NAMESPACE, "").await?.into_iter().next() else {
        return Ok(None);
    };
    kv.delete(QUERY_QUEUE_NAMESPACE, &key).await?;
    let job: QueryJob = serde_json::from_str(&raw).map_err(|e| AppError::Parsing(format!("query job: {e}")))?;
    Ok(Some(job))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::QueryMode;

    #[tokio::test]
    async fn claim_next_document_job_pops_and_deletes() {
        let kv = InMemoryKv::default();
        let job = DocumentJob { document_id: "doc-1".into(), user_id: "u1".into(), content: "hello".into(), file_path: String::new() };
        kv.put(DOCUMENT_QUEUE_NAMESPACE, "doc-1", serde_json::to_string(&job).unwrap()).await.unwrap();

        let claimed = claim_next_document_job(&kv).await.unwrap().expect("job should be present");
        assert_eq!(claimed.document_id, "doc-1");
        assert!(kv.scan_prefix(DOCUMENT_QUEUE_NAMESPACE, "").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn claim_next_document_job_returns_none_when_empty() {
        let kv = InMemoryKv::default();
        assert!(claim_next_document_job(&kv).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn claim_next_query_job_round_trips_deep_flag() {
        let kv = InMemoryKv::default();
        let request = QueryRequest {
            query: "what happened?".into(),
            mode: QueryMode::Hybrid,
            style: Default::default(),
            user_id: "u1".into(),
            conversation_history: Vec::new(),
        };
        let job = QueryJob { request_id: "req-1".into(), request, deep: true };
        kv.put(QUERY_QUEUE_NAMESPACE, "req-1", serde_json::to_string(&job).unwrap()).await.unwrap();

        let claimed = claim_next_query_job(&kv).await.unwrap().expect("job should be present");
        assert_eq!(claimed.request_id, "req-1");
        assert!(claimed.deep);
        assert!(kv.scan_prefix(QUERY_QUEUE_NAMESPACE, "").await.unwrap().is_empty());
    }
}
