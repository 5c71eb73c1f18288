//! Keyword extraction (spec.md §4.F): turns a query plus conversation
//! history into the normative [`Keywords`] 3-tuple that drives mode
//! routing (spec.md §9 Open Question c).

use common::{
    error::AppError,
    llm::LlmClient,
    model::Keywords,
    prompts::KEYWORD_EXTRACTION_SYSTEM_PROMPT,
    storage::KvStore,
    text::first_json_object,
};
use serde_json::json;
use tracing::debug;

use crate::cache::ResponseCache;

const CACHE_MODE: &str = "keywords";
const CACHE_TYPE: &str = "keywords";

fn schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "high_level_keywords": { "type": "array", "items": { "type": "string" } },
            "low_level_keywords": { "type": "array", "items": { "type": "string" } },
            "community": { "type": "string" }
        },
        "required": ["high_level_keywords", "low_level_keywords", "community"],
        "additionalProperties": false
    })
}

fn cache_input(query: &str, history: &[String]) -> String {
    format!("{}|{query}", history.join("\n"))
}

/// Extracts high-level/low-level/community keywords from `query` and the
/// preceding `history` (spec.md §4.F), checking `cache` first and storing
/// the result back on a miss (SPEC_FULL.md §4.F step 1-2). Falls back to
/// scanning the raw completion for a JSON object when the model doesn't
/// honor strict JSON mode, the same tolerance
/// [`common::text::first_json_object`] exists for. Empty retrieval is not an
/// error (spec.md §7) — a completion that fails to parse as JSON yields
/// [`Keywords::default`] rather than an `Err`.
pub async fn extract_keywords<K: KvStore>(
    llm: &LlmClient,
    cache: &ResponseCache<K>,
    query: &str,
    history: &[String],
) -> Result<Keywords, AppError> {
    let cache_input = cache_input(query, history);
    if let Some(entry) = cache.get(CACHE_MODE, &cache_input, CACHE_TYPE).await? {
        if let Ok(keywords) = serde_json::from_str::<Keywords>(&entry.response) {
            debug!("keyword cache hit");
            return Ok(keywords);
        }
    }

    let keywords = extract_keywords_uncached(llm, query, history).await;

    if let Ok(serialized) = serde_json::to_string(&keywords) {
        cache.put(CACHE_MODE, &cache_input, CACHE_TYPE, serialized, false).await?;
    }

    Ok(keywords)
}

/// Calls the LLM directly, with no cache lookup. Never returns `Err` for a
/// malformed completion — spec.md §7 treats empty retrieval as expected, not
/// exceptional, so a parse failure degrades to [`Keywords::default`].
async fn extract_keywords_uncached(llm: &LlmClient, query: &str, history: &[String]) -> Keywords {
    let history_block = if history.is_empty() { "(none)".to_string() } else { history.join("\n") };
    let user = format!("Conversation History:\n{history_block}\n\nCurrent Query: {query}");

    let completion = match llm.complete_json(KEYWORD_EXTRACTION_SYSTEM_PROMPT, &user, "keyword_extraction", schema()).await {
        Ok(completion) => completion,
        Err(err) => {
            debug!(error = %err, "keyword extraction call failed, returning empty keywords");
            return Keywords::default();
        }
    };

    let object = first_json_object(&completion).unwrap_or(&completion);
    #[derive(serde::Deserialize)]
    struct Raw {
        #[serde(default)]
        high_level_keywords: Vec<String>,
        #[serde(default)]
        low_level_keywords: Vec<String>,
        #[serde(default)]
        community: String,
    }

    let raw: Raw = match serde_json::from_str(object) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(error = %err, "keyword extraction response did not parse, returning empty keywords");
            return Keywords::default();
        }
    };
    debug!(
        high = raw.high_level_keywords.len(),
        low = raw.low_level_keywords.len(),
        community = %raw.community,
        "extracted keywords"
    );

    Keywords {
        high_level: raw.high_level_keywords,
        low_level: raw.low_level_keywords,
        community: if raw.community.is_empty() { Vec::new() } else { vec![raw.community] },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_all_three_keys() {
        let value = schema();
        let required = value["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
    }
}
