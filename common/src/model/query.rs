use serde::{Deserialize, Serialize};

/// Retrieval mode (spec.md §4.G): selects which combination of graph and
/// vector signal feeds the assembled context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Naive,
    Local,
    Global,
    Hybrid,
    Mix,
    /// Sends the query and conversation history straight to the LLM with no
    /// retrieval at all, returning its response verbatim (spec.md §3,
    /// SPEC_FULL.md §4.H).
    Bypass,
}

/// Response style (spec.md §4.H): orthogonal to [`QueryMode`] — it picks
/// the system prompt the assembled context is rendered through, not the
/// retrieval strategy that gathered it. `Analyst` is the committee-of-
/// experts persona supplemented from `original_source`'s `analyste` mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    #[default]
    Standard,
    Analyst,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub mode: QueryMode,
    #[serde(default)]
    pub style: ResponseStyle,
    pub user_id: String,
    #[serde(default)]
    pub conversation_history: Vec<String>,
}
