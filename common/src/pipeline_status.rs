use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-document progress tracking surfaced to callers of the extraction
/// pipeline (spec.md §4.D). Distinct from the pipeline's internal
/// task-level state machine: this is the externally observable summary a
/// caller polls or logs, not the in-flight control-flow state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentStage {
    Queued,
    Chunking,
    Extracting,
    Merging,
    Completed,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub document_id: String,
    pub stage: DocumentStage,
    pub chunks_total: usize,
    pub chunks_extracted: usize,
    pub records_merged: usize,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PipelineStatus {
    pub fn queued(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            stage: DocumentStage::Queued,
            chunks_total: 0,
            chunks_extracted: 0,
            records_merged: 0,
            error: None,
            updated_at: Utc::now(),
        }
    }

    pub fn advance(&mut self, stage: DocumentStage) {
        self.stage = stage;
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.stage = DocumentStage::Failed;
        self.error = Some(reason.into());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_sets_stage_and_reason() {
        let mut status = PipelineStatus::queued("doc-1");
        status.fail("llm timeout");
        assert_eq!(status.stage, DocumentStage::Failed);
        assert_eq!(status.error.as_deref(), Some("llm timeout"));
    }
}
