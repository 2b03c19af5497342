//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Largest number of inputs a provider accepts in one request unless it says otherwise
pub const DEFAULT_PROVIDER_BATCH_CEILING: usize = 2048;

/// Trait for embedding providers
///
/// `embed` must return exactly one vector per input, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a group of texts in a single request
    async fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Maximum number of texts accepted per request
    fn max_batch_size(&self) -> usize {
        DEFAULT_PROVIDER_BATCH_CEILING
    }
}
