//! Generation provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ChatMessage, Result};

/// A chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Trait for text generation providers (e.g., OpenAI chat completions)
///
/// Implementations send the messages as-is and return the generated text.
/// Failures are propagated to the caller; there is no retry at this level.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a reply for the given messages
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
