pub mod cache;
pub mod engine;
pub mod keywords;
pub mod router;
pub mod scoring;

pub use cache::ResponseCache;
pub use engine::{truncate_to_budget, RetrievalEngine, RetrievalResult, RetrievedChunk, RetrievedEdge, RetrievedEntity};
pub use keywords::extract_keywords;
pub use router::QueryRouter;
