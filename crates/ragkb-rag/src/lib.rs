//! Retrieval-augmented generation pipeline for RAGKB
//!
//! This crate provides token-window chunking, batched embedding, brute-force
//! cosine vector stores, a directory loader and the pipeline that ties them
//! together for ingest and query.

mod chunker;
mod embedder;
mod engine;
mod loader;
pub mod mock;
mod prompt;
mod tokenizer;
mod vector_store;


pub use chunker::{token_windows, TextChunker};
pub use embedder::{normalize_text, Embedder};
pub use engine::RagPipeline;
pub use loader::{json_to_text, pdf_to_text, DirectoryLoader};
pub use prompt::{build_prompt, format_context, NO_RELEVANT_INFORMATION, SYSTEM_PROMPT};
pub use tokenizer::{Cl100kTokenizer, Tokenizer};
pub use vector_store::{cosine_similarity, rank_records, JsonFileVectorStore, MemoryVectorStore};

// Re-export core types for convenience
pub use ragkb_core::{
    Chunk, ChunkMetadata, Document, DocumentLoader, DocumentType, EmbeddedChunk, EmbeddingProvider,
    Error, GenerationProvider, IngestReport, IngestStatus, QueryAnswer, QueryResult, RagConfig,
    Result, StoreStats, VectorStore,
};
