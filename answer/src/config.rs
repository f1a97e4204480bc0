//! Configuration for the answering service.
//!
//! Loaded once at startup from TOML. Every section has defaults, so an empty
//! file is a valid configuration:
//!
//! ```toml
//! [retrieval]
//! chunk_size = 300
//! top_k = 3
//!
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-3-small"
//!
//! [generation]
//! model = "gpt-4o-mini"
//!
//! [[companies]]
//! name = "Tesla"
//! ticker = "TSLA"
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use finsight_embeddings::{CachedProvider, EmbeddingProvider, HashingProvider, OpenAIProvider};
use finsight_retrieval::RetrievalConfig;

use crate::error::ConfigError;
use crate::subject::{CompanyDirectory, CompanyEntry};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Chunking and retrieval settings.
    pub retrieval: RetrievalConfig,

    /// Embedding provider settings.
    pub embedding: EmbeddingConfig,

    /// Chat model settings.
    pub generation: GenerationConfig,

    /// Companies questions can be about.
    pub companies: Vec<CompanyEntry>,
}

impl AnswerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        info!(
            "Loaded configuration from {} ({} companies)",
            path.display(),
            config.companies.len()
        );
        Ok(config)
    }

    /// Check sizes and the company list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retrieval
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.embedding.dimensions == Some(0) {
            return Err(ConfigError::Invalid(
                "embedding.dimensions must be positive".to_string(),
            ));
        }
        self.directory()?;
        Ok(())
    }

    /// Build the company directory.
    pub fn directory(&self) -> Result<CompanyDirectory, ConfigError> {
        CompanyDirectory::new(self.companies.iter().cloned())
    }

    /// Build the shared embedder described by `[embedding]`.
    pub fn embedder(&self) -> Result<Arc<dyn EmbeddingProvider>, ConfigError> {
        self.embedding.build()
    }
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            retrieval: RetrievalConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            companies: default_companies(),
        }
    }
}

/// Companies known without any configuration.
pub fn default_companies() -> Vec<CompanyEntry> {
    [
        ("Apple", "AAPL"),
        ("Microsoft", "MSFT"),
        ("Amazon", "AMZN"),
        ("Alphabet", "GOOGL"),
        ("Google", "GOOGL"),
        ("Meta", "META"),
        ("Nvidia", "NVDA"),
        ("Tesla", "TSLA"),
    ]
    .into_iter()
    .map(|(name, ticker)| CompanyEntry::new(name, ticker))
    .collect()
}

/// Configuration for the embedding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which provider to use.
    pub provider: EmbeddingProviderType,

    /// Model to use for embeddings.
    pub model: Option<String>,

    /// Output dimension override.
    pub dimensions: Option<usize>,

    /// Maximum cached vectors; 0 disables the cache.
    pub cache_max_entries: usize,
}

impl EmbeddingConfig {
    /// Construct the provider. Called once at startup; the result is shared.
    pub fn build(&self) -> Result<Arc<dyn EmbeddingProvider>, ConfigError> {
        match self.provider {
            EmbeddingProviderType::OpenAI => {
                let mut provider = OpenAIProvider::new();
                if let Some(model) = &self.model {
                    provider = provider.with_model(model);
                }
                if let Some(dims) = self.dimensions {
                    provider = provider.with_dimensions(dims);
                }
                if !provider.is_available() {
                    return Err(ConfigError::Invalid(
                        "OPENAI_API_KEY is not set for the openai embedding provider".to_string(),
                    ));
                }
                Ok(Arc::new(CachedProvider::new(
                    provider,
                    self.cache_max_entries,
                )))
            }
            EmbeddingProviderType::Hashing => {
                let dims = self
                    .dimensions
                    .unwrap_or(HashingProvider::DEFAULT_DIMENSION);
                Ok(Arc::new(HashingProvider::new(dims)?))
            }
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::OpenAI,
            model: None,
            dimensions: None,
            cache_max_entries: 10000,
        }
    }
}

/// Type of embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderType {
    /// OpenAI embeddings API.
    #[serde(rename = "openai")]
    OpenAI,
    /// Offline hashed n-gram embeddings.
    Hashing,
}

/// Configuration for the chat model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Chat model name.
    pub model: String,

    /// API base URL.
    pub base_url: String,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Maximum answer tokens.
    pub max_tokens: Option<u32>,

    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: None,
            max_tokens: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}
