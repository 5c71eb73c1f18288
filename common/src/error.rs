use async_openai::error::OpenAIError;
use thiserror::Error;

/// Error taxonomy for the retrieval/extraction core (spec.md §7).
///
/// Storage/Llm variants carry a `String` rather than a concrete backend error
/// type because storage and LLM access are trait objects (`KvStore`,
/// `VectorStore`, `GraphStore`, `LlmClient`) — the core never depends on a
/// specific backend crate.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("LLM error: {0}")]
    Llm(String),
    #[error("OpenAI error: {0}")]
    OpenAi(#[from] OpenAIError),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("geocoding error: {0}")]
    Geocoding(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("LLM call timed out after {0}s")]
    Timeout(u64),
}

impl AppError {
    /// Parse errors never fail a caller (spec.md §4.B) — this helper makes the
    /// "log and drop" policy explicit at call sites instead of silently
    /// swallowing errors inline.
    pub fn log_dropped_record(context: &str, reason: &str) {
        tracing::debug!(context, reason, "dropped malformed record during parsing");
    }
}
