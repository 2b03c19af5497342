//! Error types for the RAGKB knowledge base

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the RAGKB system
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("Generation provider error: {0}")]
    GenerationProvider(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Whether the error came from an embedding or generation provider call
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Error::EmbeddingProvider(_)
                | Error::GenerationProvider(_)
                | Error::Authentication(_)
                | Error::RateLimited(_)
                | Error::Network(_)
                | Error::Timeout(_)
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
