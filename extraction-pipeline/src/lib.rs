//! Chunking, LLM extraction, gleaning, and graph merge for one ingested
//! document (spec.md §4.B, §4.C, §4.D, §4.E).

pub mod extractor;
pub mod merge;
pub mod pipeline;

pub use extractor::ExtractorConfig;
pub use merge::{MergeConfig, MergeEngine, MergeSummary};
pub use pipeline::ExtractionPipeline;
