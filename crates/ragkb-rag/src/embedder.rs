//! Batched embedding of chunks and queries

use std::sync::Arc;

use ragkb_core::{
    Chunk, EmbeddedChunk, EmbeddingConfig, EmbeddingProvider, Error, Result,
};

/// Collapse newlines to spaces and trim, as sent to the provider
pub fn normalize_text(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}

/// Maps text to vectors through an embedding provider
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    config: EmbeddingConfig,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: EmbeddingConfig) -> Self {
        Self { provider, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Default batch size from configuration
    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    /// Embed a single text with one request
    pub async fn get_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let input = vec![normalize_text(text)];
        let mut vectors = self.provider.embed(&self.config.model, &input).await?;

        if vectors.len() != 1 {
            return Err(Error::EmbeddingProvider(format!(
                "expected 1 embedding, provider returned {}",
                vectors.len()
            )));
        }

        Ok(vectors.remove(0))
    }

    /// Embed `texts` in consecutive groups of at most `batch_size`, preserving order
    pub async fn get_embeddings_batch(
        &self,
        texts: &[String],
        batch_size: usize,
    ) -> Result<Vec<Vec<f32>>> {
        if batch_size == 0 {
            return Err(Error::InvalidInput("batch_size must be greater than zero".to_string()));
        }

        let ceiling = self.provider.max_batch_size();
        let batch_size = if batch_size > ceiling {
            tracing::warn!(
                requested = batch_size,
                ceiling = ceiling,
                "Batch size exceeds provider limit, clamping"
            );
            ceiling
        } else {
            batch_size
        };

        let mut all_embeddings = Vec::with_capacity(texts.len());
        let mut dimension: Option<usize> = None;

        for (batch_index, batch) in texts.chunks(batch_size).enumerate() {
            let normalized: Vec<String> = batch.iter().map(|t| normalize_text(t)).collect();
            let vectors = self.provider.embed(&self.config.model, &normalized).await?;

            if vectors.len() != batch.len() {
                return Err(Error::EmbeddingProvider(format!(
                    "batch {} returned {} embeddings for {} inputs",
                    batch_index,
                    vectors.len(),
                    batch.len()
                )));
            }

            for vector in &vectors {
                match dimension {
                    None => dimension = Some(vector.len()),
                    Some(expected) if expected != vector.len() => {
                        return Err(Error::DimensionMismatch {
                            expected,
                            actual: vector.len(),
                        });
                    }
                    Some(_) => {}
                }
            }

            tracing::debug!(batch = batch_index, inputs = batch.len(), "Embedded batch");
            all_embeddings.extend(vectors);
        }

        Ok(all_embeddings)
    }

    /// Attach an embedding to every chunk, pairing results positionally
    pub async fn embed_chunks(
        &self,
        chunks: Vec<Chunk>,
        batch_size: usize,
    ) -> Result<Vec<EmbeddedChunk>> {
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.get_embeddings_batch(&texts, batch_size).await?;

        if embeddings.len() != chunks.len() {
            return Err(Error::EmbeddingProvider(format!(
                "received {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        Ok(chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk::new(chunk, embedding))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEmbeddingProvider;
    use ragkb_core::{ChunkMetadata, DocumentType};

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                chunk_id: format!("chunk-{}", i),
                text: text.to_string(),
                source: "doc.txt".to_string(),
                metadata: ChunkMetadata {
                    doc_type: DocumentType::Txt,
                    chunk_index: i,
                    total_chunks: texts.len(),
                },
            })
            .collect()
    }

    fn embedder(provider: Arc<MockEmbeddingProvider>) -> Embedder {
        Embedder::new(provider, EmbeddingConfig::default())
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  line one\nline two\n"), "line one line two");
        assert_eq!(normalize_text("\n\n"), "");
    }

    #[tokio::test]
    async fn test_get_embedding_normalizes() {
        let provider = Arc::new(MockEmbeddingProvider::new(16));
        let embedder = embedder(provider.clone());

        let vector = embedder.get_embedding("  What is\nthe capital?  ").await.unwrap();
        assert_eq!(vector.len(), 16);
        assert_eq!(
            provider.requests(),
            vec![vec!["What is the capital?".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_batches_are_consecutive_groups() {
        let provider = Arc::new(MockEmbeddingProvider::new(8));
        let embedder = embedder(provider.clone());
        let texts: Vec<String> = (0..7).map(|i| format!("text {}", i)).collect();

        let vectors = embedder.get_embeddings_batch(&texts, 3).await.unwrap();
        assert_eq!(vectors.len(), 7);

        let sizes: Vec<usize> = provider.requests().iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        let flattened: Vec<String> = provider.requests().into_iter().flatten().collect();
        assert_eq!(flattened, texts);
    }

    #[tokio::test]
    async fn test_embed_chunks_preserves_order_for_every_batch_size() {
        let texts = ["alpha beta", "gamma delta", "epsilon zeta"];

        for batch_size in [1, 2, 3, 4, 100] {
            let provider = Arc::new(MockEmbeddingProvider::new(32));
            let embedder = embedder(provider.clone());

            let embedded = embedder.embed_chunks(chunks(&texts), batch_size).await.unwrap();
            assert_eq!(embedded.len(), 3);

            for (i, item) in embedded.iter().enumerate() {
                assert_eq!(item.chunk.chunk_id, format!("chunk-{}", i));
                assert_eq!(item.embedding, provider.vector_for(texts[i]));
            }
        }
    }

    #[tokio::test]
    async fn test_embed_chunks_empty_input() {
        let provider = Arc::new(MockEmbeddingProvider::new(8));
        let embedder = embedder(provider.clone());

        let embedded = embedder.embed_chunks(Vec::new(), 100).await.unwrap();
        assert!(embedded.is_empty());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_embed_chunks_single_chunk() {
        let provider = Arc::new(MockEmbeddingProvider::new(8));
        let embedder = embedder(provider.clone());

        let embedded = embedder.embed_chunks(chunks(&["only one"]), 100).await.unwrap();
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].embedding, provider.vector_for("only one"));
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_exact_batch_boundary_issues_one_request() {
        let provider = Arc::new(MockEmbeddingProvider::new(8));
        let embedder = embedder(provider.clone());
        let texts = ["a", "b", "c", "d"];

        let embedded = embedder.embed_chunks(chunks(&texts), 4).await.unwrap();
        assert_eq!(embedded.len(), 4);
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        let provider = Arc::new(MockEmbeddingProvider::new(8));
        let embedder = embedder(provider);
        let err = embedder
            .get_embeddings_batch(&["x".to_string()], 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_batch_size_clamped_to_provider_ceiling() {
        let provider = Arc::new(MockEmbeddingProvider::new(8).with_max_batch_size(2));
        let embedder = embedder(provider.clone());
        let texts: Vec<String> = (0..5).map(|i| i.to_string()).collect();

        embedder.get_embeddings_batch(&texts, 100).await.unwrap();
        let sizes: Vec<usize> = provider.requests().iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_short_provider_response_is_rejected() {
        let provider = Arc::new(MockEmbeddingProvider::new(8).dropping_last());
        let embedder = embedder(provider);

        let err = embedder
            .embed_chunks(chunks(&["one", "two"]), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmbeddingProvider(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = Arc::new(MockEmbeddingProvider::new(8).failing());
        let embedder = embedder(provider);

        let err = embedder.get_embedding("anything").await.unwrap_err();
        assert!(err.is_provider_error());
    }
}
