//! Wire-level tests for the OpenAI client against a local listener

#[cfg(test)]
mod http_tests {
    use crate::{
        ChatMessage, EmbeddingProvider, Error, GenerationProvider, GenerationRequest, OpenAiClient,
        OpenAiConfig,
    };
    use insta::assert_json_snapshot;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serve exactly one HTTP response and hand back the raw request
    async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{}/v1", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let content_length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&buf).to_string()
    }

    fn request_body(raw: &str) -> serde_json::Value {
        let body = raw.split("\r\n\r\n").nth(1).unwrap_or_default();
        serde_json::from_str(body).unwrap()
    }

    fn client_for(base_url: &str) -> OpenAiClient {
        OpenAiClient::new(OpenAiConfig::new("sk-test").with_base_url(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_embeddings_reordered_by_index() {
        let body = json!({
            "object": "list",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
            ],
            "model": "text-embedding-3-small"
        })
        .to_string();
        let (base_url, server) = serve_once("200 OK", body).await;
        let client = client_for(&base_url);

        let texts = vec!["first".to_string(), "second".to_string()];
        let vectors = client.embed("text-embedding-3-small", &texts).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /v1/embeddings"));
        assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
        assert_json_snapshot!(request_body(&raw), @r###"
        {
          "model": "text-embedding-3-small",
          "input": [
            "first",
            "second"
          ]
        }
        "###);
    }

    #[tokio::test]
    async fn test_embedding_count_mismatch_is_rejected() {
        let body = json!({
            "data": [{"index": 0, "embedding": [1.0, 0.0]}]
        })
        .to_string();
        let (base_url, _server) = serve_once("200 OK", body).await;
        let client = client_for(&base_url);

        let texts = vec!["a".to_string(), "b".to_string()];
        let err = client.embed("text-embedding-3-small", &texts).await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingProvider(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_propagates() {
        let body = json!({"error": {"message": "Rate limit reached"}}).to_string();
        let (base_url, _server) = serve_once("429 Too Many Requests", body).await;
        let client = client_for(&base_url);

        let err = client
            .embed("text-embedding-3-small", &["a".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RateLimited(_)));
        assert!(err.is_provider_error());
    }

    #[tokio::test]
    async fn test_chat_completion() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Paris."}, "finish_reason": "stop"}
            ]
        })
        .to_string();
        let (base_url, server) = serve_once("200 OK", body).await;
        let client = client_for(&base_url);

        let request = GenerationRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage::system("Answer from context."),
                ChatMessage::user("What is the capital of France?"),
            ],
            temperature: 0.5,
        };
        let answer = client.generate(&request).await.unwrap();
        assert_eq!(answer, "Paris.");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /v1/chat/completions"));
        assert_json_snapshot!(request_body(&raw), @r###"
        {
          "model": "gpt-4o-mini",
          "messages": [
            {
              "role": "system",
              "content": "Answer from context."
            },
            {
              "role": "user",
              "content": "What is the capital of France?"
            }
          ],
          "temperature": 0.5
        }
        "###);
    }

    #[tokio::test]
    async fn test_chat_authentication_failure() {
        let body = json!({"error": {"message": "Incorrect API key provided"}}).to_string();
        let (base_url, _server) = serve_once("401 Unauthorized", body).await;
        let client = client_for(&base_url);

        let request = GenerationRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.3,
        };
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[tokio::test]
    async fn test_chat_without_choices_is_provider_error() {
        let (base_url, _server) = serve_once("200 OK", json!({"choices": []}).to_string()).await;
        let client = client_for(&base_url);

        let request = GenerationRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.3,
        };
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, Error::GenerationProvider(_)));
    }
}
