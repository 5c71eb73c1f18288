use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Process-wide configuration, loaded once at startup (spec.md §7
/// configuration: environment-first, file-optional, no hot reload).
#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Maximum concurrent extraction tasks per document (spec.md §4.D).
    #[serde(default = "default_extraction_concurrency")]
    pub extraction_concurrency: usize,
    /// Re-prompt rounds for gleaning low-yield extraction passes (spec.md §4.B).
    #[serde(default = "default_gleaning_max_rounds")]
    pub gleaning_max_rounds: u32,
    /// Entity/edge description-fragment count that triggers LLM
    /// summarization on merge (spec.md §4.E, resolved to 6 in SPEC_FULL.md).
    #[serde(default = "default_force_llm_summary_on_merge")]
    pub force_llm_summary_on_merge: usize,
    /// Token budget for assembled retrieval context (spec.md §4.G/§4.H).
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,
    /// Max BFS depth for the deep-search controller (spec.md §4.I).
    #[serde(default = "default_deepsearch_max_depth")]
    pub deepsearch_max_depth: u32,
    /// Toggle for the optional description-enrichment LLM pass on merge
    /// (spec.md §4.E). Off by default — this core has no enrichment
    /// backend configured out of the box.
    #[serde(default)]
    pub enable_description_enrichment: bool,
    /// Toggle for the optional geocoder enrichment pass on merge (spec.md
    /// §4.E/§6/§7). Off by default for the same reason.
    #[serde(default)]
    pub enable_geocoding: bool,
    /// Toggle for the post-merge community-detection fan-out (spec.md
    /// §4.E, §9 Open Question a). Off by default since it costs an O(V+E)
    /// pass per `merge_chunk_records` call.
    #[serde(default)]
    pub enable_community_detection: bool,
    /// Toggle for caching final query responses and extracted keywords
    /// (spec.md §4.H/§4.J/§4.F). Off by default.
    #[serde(default)]
    pub enable_llm_cache: bool,
    /// Per-call LLM timeout in seconds (spec.md §5). Every chat/embedding
    /// call is wrapped in this bound.
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> u32 {
    1536
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_extraction_concurrency() -> usize {
    8
}

fn default_gleaning_max_rounds() -> u32 {
    1
}

fn default_force_llm_summary_on_merge() -> usize {
    6
}

fn default_max_context_tokens() -> usize {
    12_000
}

fn default_deepsearch_max_depth() -> u32 {
    3
}

fn default_llm_timeout_secs() -> u64 {
    crate::llm::DEFAULT_LLM_TIMEOUT_SECS
}

/// Loads configuration from an optional `config` file, overridden by
/// environment variables (spec.md §7: env wins over file, file is optional).
pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
