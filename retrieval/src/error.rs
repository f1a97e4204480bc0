//! Error types for the retrieval pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Opaque failure reported by an external collaborator (fetcher, generator).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Which external source a fetch failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Company business summary.
    Summary,
    /// News feed.
    News,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Summary => f.write_str("summary"),
            SourceKind::News => f.write_str("news"),
        }
    }
}

/// Errors that can occur while building a corpus or retrieving from it.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Bad chunk size or `k`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A fetch collaborator failed.
    #[error("{kind} source unavailable: {cause}")]
    SourceUnavailable {
        kind: SourceKind,
        #[source]
        cause: CollaboratorError,
    },

    /// Nothing to retrieve from.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// Embedding or index failure, including dimension mismatches.
    #[error("embedding error: {0}")]
    Embedding(#[from] finsight_embeddings::EmbeddingError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
