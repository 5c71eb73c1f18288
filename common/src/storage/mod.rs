//! Storage traits (spec.md §4.A component B: "pluggable storage layer").
//!
//! Three traits — [`KvStore`], [`VectorStore`], [`GraphStore`] — mirror the
//! teacher's `SurrealDbClient` surface but as `async_trait` objects rather
//! than a single concrete SurrealDB client, so extraction, retrieval, and
//! deep-search depend only on behavior, never on a specific database. An
//! in-memory reference implementation of each lives in [`memory`] and is
//! what the test suites across the workspace exercise.

pub mod graph;
pub mod kv;
pub mod memory;
pub mod vector;

pub use graph::GraphStore;
pub use kv::KvStore;
pub use memory::{InMemoryGraph, InMemoryKv, InMemoryVector};
pub use vector::{VectorMatch, VectorStore};
