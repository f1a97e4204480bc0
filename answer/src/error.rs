//! Error types for answering questions.

use std::fmt;

use thiserror::Error;

use finsight_embeddings::EmbeddingError;
use finsight_retrieval::{CollaboratorError, RetrievalError, SubjectId};

/// Result type alias for answer operations.
pub type Result<T> = std::result::Result<T, AnswerError>;

/// Why a question could not be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// No known company was named in the question.
    NoSubjectIdentified,
    /// Fetching the summary or the news failed.
    SourceUnavailable,
    /// The fetched sources produced no text at all.
    NoContextAvailable,
    /// Embedding, indexing or search failed.
    RetrievalFailed,
    /// The chat model call failed.
    GenerationError,
}

impl FailureReason {
    /// Message suitable for showing to the person who asked.
    pub fn user_message(self) -> &'static str {
        match self {
            FailureReason::NoSubjectIdentified => {
                "Couldn't find a known company in your question. Try naming the company."
            }
            FailureReason::SourceUnavailable => {
                "Company data could not be fetched right now. Please try again later."
            }
            FailureReason::NoContextAvailable => {
                "There is no summary or recent news available for this company."
            }
            FailureReason::RetrievalFailed => "Relevant context could not be retrieved.",
            FailureReason::GenerationError => "The answer could not be generated.",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

/// Terminal failure of one question.
#[derive(Error, Debug)]
pub enum AnswerError {
    /// No known company was named in the question.
    #[error("no known company found in question")]
    NoSubjectIdentified,

    /// A fetch collaborator failed.
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[source] RetrievalError),

    /// The corpus for the subject was empty.
    #[error("no context available for {subject}")]
    NoContextAvailable { subject: SubjectId },

    /// Embedding, indexing or search failed.
    #[error("retrieval failed: {0}")]
    Retrieval(#[source] RetrievalError),

    /// The generation collaborator failed.
    #[error("generation failed: {0}")]
    Generation(#[source] CollaboratorError),
}

impl AnswerError {
    /// The taxonomy case this failure belongs to.
    pub fn reason(&self) -> FailureReason {
        match self {
            AnswerError::NoSubjectIdentified => FailureReason::NoSubjectIdentified,
            AnswerError::SourceUnavailable(_) => FailureReason::SourceUnavailable,
            AnswerError::NoContextAvailable { .. } => FailureReason::NoContextAvailable,
            AnswerError::Retrieval(_) => FailureReason::RetrievalFailed,
            AnswerError::Generation(_) => FailureReason::GenerationError,
        }
    }

    /// Message suitable for showing to the person who asked.
    pub fn user_message(&self) -> &'static str {
        self.reason().user_message()
    }
}

/// Errors raised while loading configuration or wiring the orchestrator.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The same company name appears twice.
    #[error("duplicate company name: {0}")]
    DuplicateCompany(String),

    /// A required collaborator was not supplied to the builder.
    #[error("missing {0}")]
    Missing(&'static str),

    /// Embedder construction failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Retrieval component construction failed.
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
}
