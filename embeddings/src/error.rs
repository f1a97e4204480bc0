//! Errors raised while embedding text or searching the index.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Failures of a provider call, a cache lookup or an index operation.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// No API key was available when the provider was built.
    #[error("embedding provider not configured")]
    ProviderNotConfigured,

    /// The API answered with a non-success status other than 429.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Wrong number of vectors, or a body that could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP 429, with the server's `retry-after` (60s when absent).
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Vectors of different lengths were mixed.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Caller supplied an unusable argument (zero `k`, zero dimension).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
