//! Thin LLM client wrapper: chat completion with optional JSON-schema
//! response format, and embedding generation (spec.md §4.A/§4.B/§4.G).

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs, CreateEmbeddingRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::{error::AppError, model::GeoResult};

/// Wraps an `async-openai` client with the two operations the extraction,
/// retrieval, and deep-search crates need: chat completion and embedding.
/// Kept as a concrete struct rather than a trait — unlike storage, there is
/// exactly one LLM backend in this system, and tests inject fakes at the
/// `LlmClient`-consuming call sites instead of mocking this type.
#[derive(Clone)]
pub struct LlmClient {
    inner: Client<OpenAIConfig>,
    chat_model: String,
    embedding_model: String,
    embedding_dimensions: u32,
    timeout_secs: u64,
}

/// Default LLM call timeout (spec.md §5): 150 seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 150;

impl LlmClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        chat_model: String,
        embedding_model: String,
        embedding_dimensions: u32,
    ) -> Self {
        Self::with_timeout(api_key, base_url, chat_model, embedding_model, embedding_dimensions, DEFAULT_LLM_TIMEOUT_SECS)
    }

    pub fn with_timeout(
        api_key: &str,
        base_url: &str,
        chat_model: String,
        embedding_model: String,
        embedding_dimensions: u32,
        timeout_secs: u64,
    ) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key).with_api_base(base_url);
        Self {
            inner: Client::with_config(config),
            chat_model,
            embedding_model,
            embedding_dimensions,
            timeout_secs,
        }
    }

    /// Wraps a future in the configured timeout (spec.md §5: every LLM call
    /// is bounded so a stalled upstream request can't hang a worker forever).
    async fn call_with_timeout<T>(&self, fut: impl std::future::Future<Output = T>) -> Result<T, AppError> {
        tokio::time::timeout(Duration::from_secs(self.timeout_secs), fut)
            .await
            .map_err(|_| AppError::Timeout(self.timeout_secs))
    }

    /// Plain-text chat completion: system + user message, free-form string
    /// response. Used by extraction prompting (spec.md §4.B) and prompt
    /// assembly (spec.md §4.H), both of which parse delimited or prose text
    /// rather than strict JSON.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, AppError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .messages([
                ChatCompletionRequestSystemMessage::from(system).into(),
                ChatCompletionRequestUserMessage::from(user).into(),
            ])
            .build()?;

        let response = self.call_with_timeout(self.inner.chat().create(request)).await??;
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::Llm("no content in chat completion response".into()))?;
        debug!(chars = content.len(), "chat completion returned");
        Ok(content)
    }

    /// Chat completion constrained to a JSON schema (spec.md §4.F keyword
    /// extraction: normative 3-tuple output).
    pub async fn complete_json(
        &self,
        system: &str,
        user: &str,
        schema_name: &'static str,
        schema: Value,
    ) -> Result<String, AppError> {
        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: None,
                name: schema_name.into(),
                schema: Some(schema),
                strict: Some(true),
            },
        };

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .messages([
                ChatCompletionRequestSystemMessage::from(system).into(),
                ChatCompletionRequestUserMessage::from(user).into(),
            ])
            .response_format(response_format)
            .build()?;

        let response = self.call_with_timeout(self.inner.chat().create(request)).await??;
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::Llm("no content in chat completion response".into()))
    }

    /// Generates an embedding vector for `input` using the configured
    /// embedding model and dimensionality.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AppError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model)
            .dimensions(self.embedding_dimensions)
            .input([input])
            .build()?;

        let response = self.call_with_timeout(self.inner.embeddings().create(request)).await??;
        response
            .data
            .first()
            .map(|d| d.embedding.clone())
            .ok_or_else(|| AppError::Llm("no embedding data in response".into()))
    }
}

/// Optional external geocoding service (spec.md §6 Geocoder collaborator):
/// turns a place name into administrative/coordinate data for the merge
/// engine's geography-enrichment pass. Trait object, same seam style as
/// [`crate::storage::GraphStore`] — this core never depends on a concrete
/// geocoding backend.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, place_name: &str) -> Result<GeoResult, AppError>;
}
