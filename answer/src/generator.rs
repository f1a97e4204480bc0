//! Generation collaborators.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use finsight_retrieval::CollaboratorError;

use crate::config::GenerationConfig;

/// Instruction sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "You are a financial assistant. Answer the question using the \
provided context about the company. If the context does not contain the answer, say so.";

/// Produces an answer from a fully assembled prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError>;
}

/// Errors from the chat completions API.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No API key was available at construction.
    #[error("generation provider not configured")]
    NotConfigured,

    /// Non-success HTTP status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Response parsed but carried no answer.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// OpenAI-compatible chat completions client.
pub struct ChatCompletionsGenerator {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Chat model.
    model: String,

    temperature: Option<f32>,

    max_tokens: Option<u32>,
}

impl ChatCompletionsGenerator {
    /// Create a generator for `model`, reading `OPENAI_API_KEY` once.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Create a generator from configuration, reading the key from
    /// `config.api_key_env`.
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            api_key: std::env::var(&config.api_key_env).ok(),
            base_url: config.base_url.clone(),
            client: reqwest::Client::new(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
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

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the answer length.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The chat model in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check if an API key is set.
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send `prompt` as a single user turn and return the reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(GenerationError::NotConfigured)?;

        debug!("Requesting chat completion with model: {}", self.model);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ]
        });

        if let Some(temperature) = self.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                GenerationError::MalformedResponse("No message content in response".to_string())
            })?;

        info!("Generated answer of {} characters", content.chars().count());

        Ok(content)
    }
}

#[async_trait]
impl Generator for ChatCompletionsGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError> {
        Ok(self.complete(prompt).await?)
    }
}

/// Chat completions response format.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
