use crate::embeddings::EmbeddingProvider;
use crate::error::QueryError;
use crate::net::{send_with_retry, RetryPolicy, REQUEST_TIMEOUT};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1_536;
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

fn require_api_key(api_key: &str) -> Result<String, QueryError> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err(QueryError::MissingApiKey("OPENAI_API_KEY".to_string()));
    }
    Ok(key.to_string())
}

fn build_client() -> Result<Client, QueryError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

async fn error_from_response(service: &str, response: reqwest::Response) -> QueryError {
    let status = response.status().to_string();
    let details = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    QueryError::Backend {
        service: service.to_string(),
        status,
        details,
    }
}

/// Hosted embedding provider backed by the OpenAI embeddings endpoint.
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    dimensions: usize,
    retry: RetryPolicy,
}

impl OpenAiEmbedder {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self, QueryError> {
        Ok(Self {
            client: build_client()?,
            endpoint: Url::parse(base_url)?.join("/v1/embeddings")?,
            api_key: require_api_key(api_key)?,
            model: model.into(),
            dimensions,
            retry: RetryPolicy::default(),
        })
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, QueryError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| QueryError::Backend {
            service: "openai".to_string(),
            status: "200 OK".to_string(),
            details: "embeddings response contained no rows".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, QueryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let response = send_with_retry(self.retry, || {
            self.client
                .post(self.endpoint.clone())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
        })
        .await?;

        if !response.status().is_success() {
            return Err(error_from_response("openai", response).await);
        }

        let parsed: EmbeddingsResponse = response.json().await?;
        if parsed.data.len() != texts.len() {
            return Err(QueryError::Backend {
                service: "openai".to_string(),
                status: "200 OK".to_string(),
                details: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    parsed.data.len()
                ),
            });
        }

        let mut vectors = Vec::with_capacity(parsed.data.len());
        for row in parsed.data {
            if row.embedding.len() != self.dimensions {
                return Err(QueryError::Backend {
                    service: "openai".to_string(),
                    status: "200 OK".to_string(),
                    details: format!(
                        "embedding dimension {} != configured {}",
                        row.embedding.len(),
                        self.dimensions
                    ),
                });
            }
            vectors.push(row.embedding);
        }

        Ok(vectors)
    }
}

/// Hosted chat-completion client. One user message in, the first choice's
/// content out, verbatim.
pub struct OpenAiChatClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl OpenAiChatClient {
    pub fn new(base_url: &str, api_key: &str, model: impl Into<String>) -> Result<Self, QueryError> {
        Ok(Self {
            client: build_client()?,
            endpoint: Url::parse(base_url)?.join("/v1/chat/completions")?,
            api_key: require_api_key(api_key)?,
            model: model.into(),
            retry: RetryPolicy::default(),
        })
    }

    pub async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, QueryError> {
        let body = ChatRequest {
            model: &self.model,
            temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = send_with_retry(self.retry, || {
            self.client
                .post(self.endpoint.clone())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
        })
        .await?;

        if !response.status().is_success() {
            return Err(error_from_response("openai", response).await);
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| QueryError::Backend {
                service: "openai".to_string(),
                status: "200 OK".to_string(),
                details: "completion response contained no choices".to_string(),
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::{OpenAiChatClient, OpenAiEmbedder};
    use crate::embeddings::EmbeddingProvider;
    use crate::error::QueryError;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn blank_api_key_is_rejected() {
        let result = OpenAiEmbedder::new("https://api.openai.com", "  ", "model", 4);
        assert!(matches!(result, Err(QueryError::MissingApiKey(_))));

        let result = OpenAiChatClient::new("https://api.openai.com", "", "model");
        assert!(matches!(result, Err(QueryError::MissingApiKey(_))));
    }

    #[tokio::test]
    async fn embeddings_are_parsed_and_validated() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200).json_body(json!({
                "data": [
                    { "embedding": [0.1, 0.2, 0.3] },
                    { "embedding": [0.4, 0.5, 0.6] }
                ]
            }));
        });

        let embedder = OpenAiEmbedder::new(&server.base_url(), "test-key", "test-model", 3).unwrap();
        let texts = vec!["first".to_string(), "second".to_string()];
        let vectors = embedder.embed_batch(&texts).await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200).json_body(json!({
                "data": [ { "embedding": [0.1, 0.2] } ]
            }));
        });

        let embedder = OpenAiEmbedder::new(&server.base_url(), "test-key", "test-model", 3).unwrap();
        let result = embedder.embed("text").await;
        assert!(matches!(result, Err(QueryError::Backend { .. })));
    }

    #[tokio::test]
    async fn auth_failure_surfaces_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401).body("invalid api key");
        });

        let client = OpenAiChatClient::new(&server.base_url(), "bad-key", "test-model").unwrap();
        let result = client.complete("prompt", 0.0).await;

        match result {
            Err(QueryError::Backend { status, details, .. }) => {
                assert!(status.contains("401"));
                assert!(details.contains("invalid api key"));
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn completion_returns_first_choice_content() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .json_body_partial(r#"{ "temperature": 0.0 }"#);
            then.status(200).json_body(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "The sky is blue." } }
                ]
            }));
        });

        let client = OpenAiChatClient::new(&server.base_url(), "test-key", "test-model").unwrap();
        let answer = client.complete("What color is the sky?", 0.0).await.unwrap();
        assert_eq!(answer, "The sky is blue.");
    }

    #[tokio::test]
    async fn empty_choice_list_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        });

        let client = OpenAiChatClient::new(&server.base_url(), "test-key", "test-model").unwrap();
        let result = client.complete("prompt", 0.0).await;
        assert!(matches!(result, Err(QueryError::Backend { .. })));
    }
}
