//! OpenAI client implementation

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use ragkb_core::{
    ChatMessage, EmbeddingProvider, Error, GenerationProvider, GenerationRequest, Result,
    DEFAULT_PROVIDER_BATCH_CEILING,
};

use crate::config::OpenAiConfig;

/// OpenAI-compatible client for embeddings and chat completions
pub struct OpenAiClient {
    client: Client,
    embeddings_url: String,
    chat_url: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Which capability a request belongs to, for error classification
#[derive(Debug, Clone, Copy)]
enum Capability {
    Embedding,
    Generation,
}

impl Capability {
    fn error(self, message: String) -> Error {
        match self {
            Capability::Embedding => Error::EmbeddingProvider(message),
            Capability::Generation => Error::GenerationProvider(message),
        }
    }
}

impl OpenAiClient {
    /// Create a new client from configuration
    ///
    /// Fails with `Error::Configuration` when no API key is set, before any request is made.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(Error::Configuration("OpenAI API key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| Error::Configuration("OpenAI API key is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Connectivity(format!("failed to build OpenAI HTTP client: {}", e)))?;

        Ok(Self {
            client,
            embeddings_url: config.endpoint("embeddings"),
            chat_url: config.endpoint("chat/completions"),
        })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OpenAiConfig::from_env()?;
        Self::new(config)
    }

    async fn post_json<B, R>(&self, url: &str, body: &B, capability: Capability) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!("request to {} timed out", url))
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(status_error(capability, status, &error_text));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| capability.error(format!("failed to parse response: {}", e)))
    }
}

/// Map a non-success HTTP status to the error taxonomy
fn status_error(capability: Capability, status: StatusCode, body: &str) -> Error {
    let message = format!("OpenAI request failed with status {}: {}", status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(message),
        _ => capability.error(message),
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(model = %model, inputs = texts.len(), "Requesting embeddings");

        let request = EmbeddingRequest { model, input: texts };
        let mut parsed: EmbeddingResponse = self
            .post_json(&self.embeddings_url, &request, Capability::Embedding)
            .await?;

        if parsed.data.len() != texts.len() {
            return Err(Error::EmbeddingProvider(format!(
                "OpenAI returned {} embeddings for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        parsed.data.sort_by_key(|entry| entry.index);
        Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
    }

    fn max_batch_size(&self) -> usize {
        DEFAULT_PROVIDER_BATCH_CEILING
    }
}

#[async_trait]
impl GenerationProvider for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            temperature = request.temperature,
            "Requesting chat completion"
        );

        let body = ChatRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
        };
        let parsed: ChatResponse = self
            .post_json(&self.chat_url, &body, Capability::Generation)
            .await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::GenerationProvider("OpenAI returned no completion".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        let result = OpenAiClient::new(OpenAiConfig::new("  "));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_endpoints() {
        let config = OpenAiConfig::new("sk-test").with_base_url("http://127.0.0.1:9/v1");
        let client = OpenAiClient::new(config).unwrap();
        assert_eq!(client.embeddings_url, "http://127.0.0.1:9/v1/embeddings");
        assert_eq!(client.chat_url, "http://127.0.0.1:9/v1/chat/completions");
    }

    #[test]
    fn test_status_error_mapping() {
        let err = status_error(Capability::Embedding, StatusCode::UNAUTHORIZED, "bad key");
        assert!(matches!(err, Error::Authentication(_)));

        let err = status_error(Capability::Generation, StatusCode::TOO_MANY_REQUESTS, "slow");
        assert!(matches!(err, Error::RateLimited(_)));

        let err = status_error(Capability::Embedding, StatusCode::BAD_REQUEST, "nope");
        assert!(matches!(err, Error::EmbeddingProvider(_)));

        let err = status_error(Capability::Generation, StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert!(matches!(err, Error::GenerationProvider(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_empty_embedding_batch_skips_request() {
        // Nothing listens on the discard port, so any request would fail.
        let config = OpenAiConfig::new("sk-test").with_base_url("http://127.0.0.1:9/v1");
        let client = OpenAiClient::new(config).unwrap();
        let vectors = client.embed("text-embedding-3-small", &[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
