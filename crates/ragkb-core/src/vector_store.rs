//! Vector store trait

use async_trait::async_trait;

use crate::{EmbeddedChunk, QueryResult, Result, StoreStats};

/// Trait for chunk stores that answer nearest-neighbour queries
///
/// Ranking is exact: every stored embedding is scored against the query,
/// so a search costs O(N·D) for N records of dimension D.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append records without deduplicating by `chunk_id`; all or none are stored
    async fn insert_chunks(&self, records: Vec<EmbeddedChunk>) -> Result<usize>;

    /// Return at most `k` records ranked by cosine similarity to `query`
    async fn vector_search(&self, query: &[f32], k: usize) -> Result<Vec<QueryResult>>;

    /// Remove every record, returning how many were removed
    async fn delete_all(&self) -> Result<usize>;

    /// Record and distinct-source counts
    async fn get_stats(&self) -> Result<StoreStats>;
}
