//! Configuration for corpus construction and retrieval.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};

/// Default fragment length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 300;

/// Default number of fragments handed to the generator.
pub const DEFAULT_TOP_K: usize = 3;

/// Configuration for the retrieval pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum fragment length in characters.
    pub chunk_size: usize,

    /// Number of fragments to retrieve per question.
    pub top_k: usize,
}

impl RetrievalConfig {
    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the number of retrieved fragments.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Reject zero sizes before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RetrievalError::Config(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(RetrievalError::Config("top_k must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            top_k: DEFAULT_TOP_K,
        }
    }
}
