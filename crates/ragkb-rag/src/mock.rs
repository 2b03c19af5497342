//! Test doubles for the provider traits
//!
//! Both doubles record every request they receive so tests can assert on
//! batching, ordering and prompt contents without network access.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use ragkb_core::{
    EmbeddingProvider, Error, GenerationProvider, GenerationRequest, Result,
    DEFAULT_PROVIDER_BATCH_CEILING,
};

/// Deterministic bag-of-words embedder
///
/// Each lowercase word is hashed into one of `dimension` buckets, so texts
/// sharing words get a positive cosine similarity.
pub struct MockEmbeddingProvider {
    dimension: usize,
    max_batch_size: usize,
    drop_last: bool,
    fail: bool,
    requests: Mutex<Vec<Vec<String>>>,
}

impl MockEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            max_batch_size: DEFAULT_PROVIDER_BATCH_CEILING,
            drop_last: false,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Return one vector fewer than requested, breaking the pairing contract
    pub fn dropping_last(mut self) -> Self {
        self.drop_last = true;
        self
    }

    /// Fail every request with a provider error
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Vector the provider produces for `text`
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension];
        if self.dimension == 0 {
            return vector;
        }

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let idx = (hasher.finish() % self.dimension as u64) as usize;
            vector[idx] += 1.0;
        }

        vector
    }

    /// Every batch received so far, in call order
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, _model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail {
            return Err(Error::EmbeddingProvider("mock embedding failure".to_string()));
        }

        self.requests
            .lock()
            .map_err(|e| Error::Other(format!("Lock error: {}", e)))?
            .push(texts.to_vec());

        let mut vectors: Vec<Vec<f32>> = texts.iter().map(|t| self.vector_for(t)).collect();
        if self.drop_last {
            vectors.pop();
        }
        Ok(vectors)
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}

/// Generator that returns a canned answer
pub struct MockGenerationProvider {
    answer: String,
    fail: bool,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerationProvider {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationProvider for MockGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests
            .lock()
            .map_err(|e| Error::Other(format!("Lock error: {}", e)))?
            .push(request.clone());

        if self.fail {
            return Err(Error::GenerationProvider("mock generation failure".to_string()));
        }
        Ok(self.answer.clone())
    }
}
