//! Core traits and types for RAGKB
//!
//! This crate defines the data model, error taxonomy, configuration and the
//! capability traits (embedding, generation, vector storage, document loading)
//! that the pipeline is assembled from. Every capability can be swapped for a
//! test double with the same contract.

pub mod config;
pub mod document_loader;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod types;
pub mod vector_store;

#[cfg(test)]
mod tests;

pub use config::{
    ChunkingConfig, EmbeddingConfig, GenerationConfig, RagConfig, RetrievalConfig, StoreConfig,
};
pub use document_loader::DocumentLoader;
pub use embedding::{EmbeddingProvider, DEFAULT_PROVIDER_BATCH_CEILING};
pub use error::{Error, Result};
pub use llm::{GenerationProvider, GenerationRequest};
pub use types::*;
pub use vector_store::VectorStore;
