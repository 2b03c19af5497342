//! Runtime configuration passed explicitly to each component

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::{Error, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 100;
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_STORE_PATH: &str = "rag_db/chunks.json";

/// Token windowing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl ChunkingConfig {
    /// Check the windowing precondition `0 <= overlap < chunk_size`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidInput("chunk_size must be greater than zero".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::InvalidInput(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

/// Complete configuration of a knowledge base instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
    pub store: StoreConfig,
}

impl RagConfig {
    /// Create configuration from environment variables (and a `.env` file if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            chunking: ChunkingConfig {
                chunk_size: parse_or(&lookup, "CHUNK_SIZE", defaults.chunking.chunk_size)?,
                overlap: parse_or(&lookup, "CHUNK_OVERLAP", defaults.chunking.overlap)?,
            },
            embedding: EmbeddingConfig {
                model: lookup("EMBEDDING_MODEL").unwrap_or(defaults.embedding.model),
                batch_size: parse_or(&lookup, "EMBEDDING_BATCH_SIZE", defaults.embedding.batch_size)?,
            },
            generation: GenerationConfig {
                model: lookup("CHAT_MODEL").unwrap_or(defaults.generation.model),
                temperature: parse_or(&lookup, "TEMPERATURE", defaults.generation.temperature)?,
            },
            retrieval: RetrievalConfig {
                top_k: parse_or(&lookup, "TOP_K", defaults.retrieval.top_k)?,
            },
            store: StoreConfig {
                path: lookup("RAG_STORE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.store.path),
            },
        };

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|_| {
            Error::Configuration(format!("{} has an invalid value: {:?}", key, raw))
        }),
        _ => Ok(default),
    }
}
