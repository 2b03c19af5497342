//! Ingest and query pipeline

use std::path::Path;
use std::sync::Arc;

use ragkb_core::{
    ChunkingConfig, DocumentLoader, EmbeddingProvider, GenerationProvider, GenerationRequest,
    IngestReport, IngestStatus, QueryAnswer, RagConfig, Result, StoreStats, VectorStore,
};

use crate::chunker::TextChunker;
use crate::embedder::Embedder;
use crate::prompt::{build_prompt, NO_RELEVANT_INFORMATION};

/// Knowledge base pipeline assembled from injected capabilities
///
/// Ingest runs load, chunk, embed and insert in sequence; a failure at any
/// step aborts the call and nothing from it is stored. Query embeds the
/// question, retrieves the top-k chunks and asks the generator for an answer
/// grounded on them.
pub struct RagPipeline {
    store: Arc<dyn VectorStore>,
    embedder: Embedder,
    generator: Arc<dyn GenerationProvider>,
    loader: Arc<dyn DocumentLoader>,
    chunker: TextChunker,
    config: RagConfig,
}

impl RagPipeline {
    pub fn new(
        config: RagConfig,
        store: Arc<dyn VectorStore>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        loader: Arc<dyn DocumentLoader>,
        chunker: TextChunker,
    ) -> Self {
        Self {
            store,
            embedder: Embedder::new(embedding_provider, config.embedding.clone()),
            generator,
            loader,
            chunker,
            config,
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    /// Index every document under `directory`
    ///
    /// Chunking parameters are validated before the store is touched, so an
    /// invalid request never clears existing data.
    pub async fn ingest(
        &self,
        directory: &Path,
        chunk_size: usize,
        overlap: usize,
        clear_existing: bool,
    ) -> Result<IngestReport> {
        ChunkingConfig { chunk_size, overlap }.validate()?;

        let cleared = if clear_existing {
            let deleted = self.store.delete_all().await?;
            tracing::info!(deleted, "Cleared existing chunks");
            deleted
        } else {
            0
        };

        let documents = self.loader.load_directory(directory).await?;
        if documents.is_empty() {
            tracing::info!(directory = %directory.display(), "No documents to ingest");
            return Ok(IngestReport::no_documents(cleared));
        }

        let chunks = self.chunker.chunk_documents(&documents, chunk_size, overlap)?;
        tracing::info!(documents = documents.len(), chunks = chunks.len(), "Created chunks");

        let chunk_count = chunks.len();
        let embedded = self
            .embedder
            .embed_chunks(chunks, self.embedder.batch_size())
            .await?;
        tracing::info!(embeddings = embedded.len(), model = %self.embedder.model(), "Generated embeddings");

        let inserted = self.store.insert_chunks(embedded).await?;
        tracing::info!(inserted, "Stored chunks");

        Ok(IngestReport {
            documents: documents.len(),
            chunks: chunk_count,
            inserted,
            cleared,
            status: IngestStatus::Success,
        })
    }

    /// Ingest with the configured chunking parameters
    pub async fn ingest_default(&self, directory: &Path, clear_existing: bool) -> Result<IngestReport> {
        let chunking = &self.config.chunking;
        self.ingest(directory, chunking.chunk_size, chunking.overlap, clear_existing)
            .await
    }

    /// Answer `question` from the `k` most similar stored chunks
    pub async fn query(&self, question: &str, k: usize) -> Result<QueryAnswer> {
        let query_embedding = self.embedder.get_embedding(question).await?;
        let results = self.store.vector_search(&query_embedding, k).await?;

        if results.is_empty() {
            tracing::info!("No relevant chunks found");
            return Ok(QueryAnswer {
                answer: NO_RELEVANT_INFORMATION.to_string(),
                sources: Vec::new(),
                chunks: Vec::new(),
            });
        }

        tracing::debug!(retrieved = results.len(), "Retrieved context");

        let request = GenerationRequest {
            model: self.config.generation.model.clone(),
            messages: build_prompt(question, &results),
            temperature: self.config.generation.temperature,
        };
        let answer = self.generator.generate(&request).await?;

        let mut sources: Vec<String> = Vec::new();
        for result in &results {
            if !sources.contains(&result.source) {
                sources.push(result.source.clone());
            }
        }

        Ok(QueryAnswer {
            answer,
            sources,
            chunks: results,
        })
    }

    /// Query with the configured `top_k`
    pub async fn query_default(&self, question: &str) -> Result<QueryAnswer> {
        self.query(question, self.config.retrieval.top_k).await
    }

    pub async fn get_stats(&self) -> Result<StoreStats> {
        self.store.get_stats().await
    }

    /// Remove every stored chunk, returning how many were removed
    pub async fn clear(&self) -> Result<usize> {
        let deleted = self.store.delete_all().await?;
        tracing::info!(deleted, "Cleared knowledge base");
        Ok(deleted)
    }
}
