//! Per-chunk LLM extraction with gleaning (spec.md §4.B).

use common::{
    error::AppError,
    llm::LlmClient,
    model::TextChunk,
    parsing::{parse_records, Record},
    prompts::{EXTRACTION_SYSTEM_PROMPT, GLEANING_CONTINUE_PROMPT, GLEANING_LOOP_PROMPT},
    text::{COMPLETE_DELIM, RECORD_DELIM, TUPLE_DELIM},
};
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub entity_types: Vec<String>,
    pub language: String,
    pub gleaning_max_rounds: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            entity_types: vec!["person".into(), "organization".into(), "location".into(), "event".into(), "concept".into()],
            language: "English".into(),
            gleaning_max_rounds: 1,
        }
    }
}

fn system_prompt(config: &ExtractorConfig) -> String {
    EXTRACTION_SYSTEM_PROMPT
        .replace("{entity_types}", &config.entity_types.join(", "))
        .replace("{language}", &config.language)
        .replace("{tuple_delimiter}", TUPLE_DELIM)
        .replace("{record_delimiter}", RECORD_DELIM)
        .replace("{completion_delimiter}", COMPLETE_DELIM)
}

/// Runs extraction against one chunk, re-prompting up to
/// `config.gleaning_max_rounds` additional times against the same
/// conversation when the model reports entities were still missed
/// (spec.md §4.B gleaning). Returns every record parsed across all rounds.
#[instrument(level = "debug", skip_all, fields(chunk_id = %chunk.id))]
pub async fn extract_chunk(llm: &LlmClient, chunk: &TextChunk, config: &ExtractorConfig) -> Result<Vec<Record>, AppError> {
    let system = system_prompt(config);
    let mut records = Vec::new();

    let mut transcript = String::new();
    let first = llm.complete(&system, &chunk.content).await?;
    transcript.push_str(&chunk.content);
    transcript.push_str("\n\n");
    transcript.push_str(&first);
    records.extend(parse_records(&first));

    for round in 0..config.gleaning_max_rounds {
        let gleaned = llm.complete(&system, &format!("{transcript}\n\n{GLEANING_CONTINUE_PROMPT}")).await?;
        let new_records = parse_records(&gleaned);
        debug!(round, new_records = new_records.len(), "gleaning round produced records");
        if new_records.is_empty() {
            break;
        }
        transcript.push_str("\n\n");
        transcript.push_str(&gleaned);
        records.extend(new_records);

        if round + 1 < config.gleaning_max_rounds {
            let should_continue = llm.complete(&system, &format!("{transcript}\n\n{GLEANING_LOOP_PROMPT}")).await?;
            if !should_continue.trim().eq_ignore_ascii_case("yes") {
                break;
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_substitutes_placeholders() {
        let config = ExtractorConfig::default();
        let prompt = system_prompt(&config);
        assert!(prompt.contains("person, organization"));
        assert!(prompt.contains(TUPLE_DELIM));
        assert!(!prompt.contains("{entity_types}"));
    }
}
