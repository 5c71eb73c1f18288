//! Deep-search tree-of-thought controller (spec.md §4.I): BFS expansion of
//! a query into scored sub-questions, each answered through the same
//! hybrid retrieval + prompt-assembly path as a regular `hybrid` query,
//! assembled into a [`DeepSearchReport`].

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use common::{
    error::AppError,
    llm::LlmClient,
    model::{QueryMode, QueryRequest, ResponseStyle},
    storage::{GraphStore, KvStore, VectorStore},
    text::first_json_object,
};
use retrieval_pipeline::QueryRouter;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use crate::report::{DeepSearchReport, QuestionSection};

#[derive(Debug, Clone)]
pub struct DeepSearchConfig {
    pub max_concurrent_branches: usize,
    pub working_dir: PathBuf,
    /// Upper bound the LLM-rated depth (1-4 in the original algorithm) is
    /// clamped to (spec.md §4.I, SPEC_FULL.md's `deepsearch_max_depth`).
    pub max_depth_cap: u32,
}

impl Default for DeepSearchConfig {
    fn default() -> Self {
        Self { max_concurrent_branches: 4, working_dir: PathBuf::from("./data"), max_depth_cap: 4 }
    }
}

struct ToTNode {
    question: String,
    depth: usize,
}

pub struct DeepSearchController<G: GraphStore, K: KvStore, V: VectorStore> {
    router: Arc<QueryRouter<G, K, V>>,
    llm: Arc<LlmClient>,
    config: DeepSearchConfig,
}

impl<G: GraphStore, K: KvStore, V: VectorStore> DeepSearchController<G, K, V> {
    pub fn new(router: Arc<QueryRouter<G, K, V>>, llm: Arc<LlmClient>, config: DeepSearchConfig) -> Self {
        Self { router, llm, config }
    }

    /// Runs the full BFS tree-of-thought over `query` and writes a `.docx`
    /// report, returning its path (spec.md §4.I).
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self, query: &str, user_id: &str, epoch_seconds: u64) -> Result<PathBuf, AppError> {
        let max_depth = self.determine_depth(query).await;
        info!(max_depth, "deep-search depth determined");

        let max_initial = max_depth.clamp(2, 4);
        let max_follow = max_depth.saturating_sub(1).clamp(1, 3);

        let root = ToTNode { question: query.to_string(), depth: 0 };
        let mut queue: VecDeque<ToTNode> = VecDeque::new();
        queue.push_back(root);

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_branches.max(1)));
        let mut sections: Vec<QuestionSection> = Vec::new();

        while let Some(node) = queue.pop_front() {
            let answer = if node.depth > 0 {
                let _permit = semaphore.acquire().await.map_err(|e| AppError::Internal(format!("semaphore closed: {e}")))?;
                let answer = self.answer_question(&node.question, user_id).await?;
                sections.push(QuestionSection { question: node.question.clone(), answer: answer.clone() });
                Some(answer)
            } else {
                None
            };

            if node.depth >= max_depth {
                continue;
            }

            let (candidates, context, top_k) = if node.depth == 0 {
                let candidates = self.generate_subqueries(&node.question).await?;
                (candidates, node.question.clone(), max_initial)
            } else {
                let answer = answer.unwrap_or_default();
                let candidates = self.generate_followups(&node.question, &answer).await?;
                let context = format!("{}\n\n{}", node.question, answer);
                (candidates, context, max_follow)
            };

            let selected = self.select_thoughts(candidates, &context, top_k).await?;
            for question in selected {
                queue.push_back(ToTNode { question, depth: node.depth + 1 });
            }
        }

        let report = DeepSearchReport::new(query.to_string(), sections);
        report.write_docx(&self.config.working_dir, epoch_seconds)
    }

    /// Short LLM call returning an integer in `[1,4]`; falls back to 2 for
    /// queries over 10 whitespace-separated tokens, else 1 (spec.md §4.I
    /// step 1).
    async fn determine_depth(&self, query: &str) -> usize {
        let user = format!(
            "Rate the complexity of this query and determine the depth of research needed \
             (1=simple, 2=moderate, 3=complex, 4=very complex). Respond with a single integer only.\n\nQuery: {query}"
        );
        let cap = i64::from(self.config.max_depth_cap.max(1));
        match self.llm.complete(common::prompts::DEEPSEARCH_DEPTH_SYSTEM_PROMPT, &user).await {
            Ok(response) => response.trim().parse::<i64>().map(|d| d.clamp(1, cap) as usize).unwrap_or_else(|_| fallback_depth(query)),
            Err(e) => {
                warn!(error = %e, "depth determination failed, using fallback heuristic");
                fallback_depth(query)
            }
        }
    }

    async fn generate_subqueries(&self, query: &str) -> Result<Vec<String>, AppError> {
        let user = format!(
            "Decompose the main query into 2-4 precise sub-questions that each cover a distinct \
             aspect of the topic.\n\nMain query: {query}\n\nRespond ONLY with a JSON array of strings."
        );
        let response = self.llm.complete(common::prompts::DEEPSEARCH_EXPAND_SYSTEM_PROMPT, &user).await?;
        Ok(parse_json_strings(&response).unwrap_or_else(|| vec![query.to_string()]))
    }

    async fn generate_followups(&self, question: &str, answer: &str) -> Result<Vec<String>, AppError> {
        let user = format!(
            "Generate 2 deeper follow-up questions based on this question and its answer, exploring \
             complementary aspects or asking for precision on specific points.\n\n\
             ### Original question:\n{question}\n\n### Full answer:\n{answer}\n\n\
             Respond ONLY with a JSON array of strings."
        );
        let response = self.llm.complete(common::prompts::DEEPSEARCH_EXPAND_SYSTEM_PROMPT, &user).await?;
        Ok(parse_json_strings(&response).unwrap_or_default())
    }

    /// Scores each candidate `[0,1]` by the LLM and keeps the top `top_k`
    /// (spec.md §4.I step 3).
    async fn select_thoughts(&self, thoughts: Vec<String>, context: &str, top_k: usize) -> Result<Vec<String>, AppError> {
        if thoughts.len() <= top_k {
            return Ok(thoughts);
        }
        let mut scored = Vec::with_capacity(thoughts.len());
        for thought in thoughts {
            let score = self.evaluate_thought(&thought, context).await;
            scored.push((thought, score));
        }
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored.into_iter().map(|(thought, _)| thought).collect())
    }

    async fn evaluate_thought(&self, thought: &str, context: &str) -> f32 {
        let system = "Expert evaluator: analyze the quality of research questions. Respond with a single score between 0 and 1, no commentary.";
        let user = format!(
            "Evaluate the relevance and development potential of this question for producing a \
             complete, structured answer. Score between 0 (off-topic) and 1 (excellent potential).\n\n\
             Context:\n{context}\n\nQuestion to evaluate:\n{thought}"
        );
        match self.llm.complete(system, &user).await {
            Ok(response) => response.trim().parse::<f32>().map(|s| s.clamp(0.0, 1.0)).unwrap_or(0.0),
            Err(_) => 0.0,
        }
    }

    /// Answers a sub-question through the normal `hybrid` retrieval + prompt
    /// path, not a bespoke one (spec.md §4.I step 4).
    async fn answer_question(&self, question: &str, user_id: &str) -> Result<String, AppError> {
        let request = QueryRequest {
            query: question.to_string(),
            mode: QueryMode::Hybrid,
            style: ResponseStyle::Standard,
            user_id: user_id.to_string(),
            conversation_history: Vec::new(),
        };
        self.router.answer(&request).await
    }
}

fn fallback_depth(query: &str) -> usize {
    if query.split_whitespace().count() > 10 {
        2
    } else {
        1
    }
}

fn parse_json_strings(text: &str) -> Option<Vec<String>> {
    let candidate = first_json_object(text).unwrap_or(text);
    serde_json::from_str::<Vec<String>>(candidate).ok().or_else(|| {
        let start = text.find('[')?;
        let end = text.rfind(']')?;
        if end < start {
            return None;
        }
        serde_json::from_str::<Vec<String>>(&text[start..=end]).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_depth_scales_with_query_length() {
        assert_eq!(fallback_depth("short query"), 1);
        assert_eq!(fallback_depth("this is a much longer query with more than ten words in it total"), 2);
    }

    #[test]
    fn parse_json_strings_tolerates_surrounding_prose() {
        let text = "Here are the sub-questions:\n[\"a\", \"b\", \"c\"]\nHope that helps.";
        let parsed = parse_json_strings(text).unwrap();
        assert_eq!(parsed, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn parse_json_strings_returns_none_on_garbage() {
        assert!(parse_json_strings("not json at all").is_none());
    }
}
