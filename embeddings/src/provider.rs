//! Embedding providers.
//!
//! A provider turns a batch of texts into one vector per text, in input
//! order, all of the provider's fixed dimension. The same instance must embed
//! both the corpus and the query so the vectors are comparable.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::similarity::{common_dimension, normalize};

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the model this provider embeds with.
    fn model(&self) -> &str;

    /// Output dimension of every embedding this provider returns.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts. An empty batch yields an empty result.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a single text as a one-element batch.
    async fn embed_one(&self, text: &str) -> Result<Embedding> {
        self.embed(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("No embedding returned".to_string()))
    }

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool {
        true
    }
}

/// OpenAI embedding provider.
pub struct OpenAIProvider {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model.
    model: String,

    /// Requested output dimensions, if the model supports shortening.
    dimensions: Option<usize>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider, reading `OPENAI_API_KEY` once.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Request shortened output vectors.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        if let Some(dims) = self.dimensions {
            return dims;
        }
        match self.model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => crate::DEFAULT_DIMENSION,
        }
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::ProviderNotConfigured)?;

        debug!(
            "Generating batch embeddings for {} texts with model: {}",
            texts.len(),
            self.model
        );

        let mut body = serde_json::json!({
            "input": texts,
            "model": self.model
        });

        if let Some(dims) = self.dimensions {
            body["dimensions"] = serde_json::json!(dims);
        }

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        let mut result: OpenAIEmbeddingResponse = response.json().await?;

        if result.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                result.data.len()
            )));
        }

        // The API may return items out of order.
        result.data.sort_by_key(|item| item.index);
        let embeddings: Vec<Embedding> = result.data.into_iter().map(|d| d.embedding).collect();
        common_dimension(&embeddings)?;

        info!("Generated {} batch embeddings", embeddings.len());

        Ok(embeddings)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Offline, deterministic embedding provider.
///
/// Words and their character trigrams are hashed into signed buckets and the
/// result is normalized to unit length. Texts that share vocabulary land close
/// together under L2, which is enough for small per-question corpora and for
/// tests. SHA-256 keeps bucket assignment stable across processes.
#[derive(Debug, Clone)]
pub struct HashingProvider {
    dimension: usize,
}

impl HashingProvider {
    /// Default bucket count.
    pub const DEFAULT_DIMENSION: usize = 384;

    /// Create a provider with `dimension` buckets.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidArgument(
                "dimension must be positive".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    fn embed_text(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            self.accumulate(&mut vector, "w", word, 1.0);

            let padded: Vec<char> = format!(" {word} ").chars().collect();
            for tri in padded.windows(3) {
                let tri: String = tri.iter().collect();
                self.accumulate(&mut vector, "t", &tri, 0.5);
            }
        }

        normalize(&mut vector);
        vector
    }

    fn accumulate(&self, vector: &mut [f32], kind: &str, feature: &str, weight: f32) {
        let digest = Sha256::new()
            .chain_update(kind.as_bytes())
            .chain_update([0u8])
            .chain_update(feature.as_bytes())
            .finalize();

        let mut bucket_bytes = [0u8; 8];
        bucket_bytes.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };

        vector[bucket] += sign * weight;
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self {
            dimension: Self::DEFAULT_DIMENSION,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    fn name(&self) -> &str {
        "hashing"
    }

    fn model(&self) -> &str {
        "hashed-ngrams"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::squared_l2;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_openai_provider_default_dimensions() {
        let provider = OpenAIProvider::new().with_model("text-embedding-3-large");
        assert_eq!(provider.dimension(), 3072);

        let provider = OpenAIProvider::new().with_dimensions(256);
        assert_eq!(provider.dimension(), 256);
    }

    #[tokio::test]
    async fn test_hashing_provider_is_deterministic() {
        let provider = HashingProvider::new(64).unwrap();
        let text = "Tesla reports record quarterly deliveries".to_string();

        let first = provider.embed(std::slice::from_ref(&text)).await.unwrap();
        let second = provider.embed_one(&text).await.unwrap();

        assert_eq!(first[0], second);
        assert_eq!(second.len(), 64);

        let other = HashingProvider::new(64).unwrap();
        assert_eq!(other.embed_one(&text).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_hashing_provider_batch_order_and_empty() {
        let provider = HashingProvider::default();
        assert!(provider.embed(&[]).await.unwrap().is_empty());

        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let batch = provider.embed(&texts).await.unwrap();
        assert_eq!(batch[0], provider.embed_one("alpha").await.unwrap());
        assert_eq!(batch[1], provider.embed_one("beta").await.unwrap());
    }

    #[tokio::test]
    async fn test_hashing_provider_shared_words_are_closer() {
        let provider = HashingProvider::default();
        let query = provider.embed_one("electric vehicle sales").await.unwrap();
        let related = provider
            .embed_one("Electric vehicle sales rose sharply")
            .await
            .unwrap();
        let unrelated = provider
            .embed_one("Cloud software subscriptions")
            .await
            .unwrap();

        assert!(squared_l2(&query, &related).unwrap() < squared_l2(&query, &unrelated).unwrap());
    }

    #[test]
    fn test_hashing_provider_rejects_zero_dimension() {
        assert!(HashingProvider::new(0).is_err());
    }

    #[tokio::test]
    async fn test_openai_embed_reorders_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "model": "text-embedding-3-small",
                "data": [
                    { "object": "embedding", "index": 1, "embedding": [0.0, 1.0] },
                    { "object": "embedding", "index": 0, "embedding": [1.0, 0.0] }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());

        let texts = vec!["first".to_string(), "second".to_string()];
        let embeddings = provider.embed(&texts).await.unwrap();
        assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_openai_empty_batch_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        assert!(provider.embed(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_openai_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());

        let err = provider.embed_one("hello").await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::RateLimited {
                retry_after_secs: 7
            }
        ));
    }

    #[tokio::test]
    async fn test_openai_count_mismatch_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [ { "index": 0, "embedding": [1.0] } ]
            })))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());

        let texts = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            provider.embed(&texts).await,
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_openai_server_error_is_api_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());

        match provider.embed_one("hello").await {
            Err(EmbeddingError::ApiRequest(message)) => {
                assert!(message.contains("upstream failure"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_openai_ragged_batch_is_dimension_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "index": 0, "embedding": [1.0, 0.0] },
                    { "index": 1, "embedding": [1.0] }
                ]
            })))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());

        let texts = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            provider.embed(&texts).await,
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_openai_without_key_is_not_configured() {
        let provider = OpenAIProvider {
            api_key: None,
            ..OpenAIProvider::new()
        };
        assert!(!provider.is_available());
        assert!(matches!(
            provider.embed_one("hello").await,
            Err(EmbeddingError::ProviderNotConfigured)
        ));
    }
}
