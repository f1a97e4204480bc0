//! Fixed-size document chunking.
//!
//! Text is cut into consecutive slices of at most `chunk_size` characters.
//! Nothing is trimmed or normalized, so concatenating the fragments of one
//! source in order gives back the source text exactly. Sizes count Unicode
//! scalar values, never bytes, so a slice never splits a character.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RetrievalError};

/// Opaque identifier of the entity a question is about (a ticker symbol).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    /// Create a subject identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The document a fragment was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceId {
    /// The subject's business summary.
    Summary { subject: SubjectId },
    /// The `item`-th news entry (0-based, feed order).
    News { subject: SubjectId, item: usize },
}

/// An immutable slice of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    text: String,
    source: SourceId,
    offset: usize,
}

impl Fragment {
    /// Create a fragment. `offset` is the character position in its source.
    pub fn new(text: impl Into<String>, source: SourceId, offset: usize) -> Self {
        Self {
            text: text.into(),
            source,
            offset,
        }
    }

    /// The fragment text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The document this fragment came from.
    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// Character offset within the source document.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Fixed-size character chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
}

impl Chunker {
    /// Create a chunker. A zero `chunk_size` is an invalid argument.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RetrievalError::InvalidArgument(
                "chunk size must be positive".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }

    /// Maximum fragment length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split `text` into fragments tagged with `source`.
    ///
    /// Empty text yields no fragments.
    pub fn chunk(&self, text: &str, source: &SourceId) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let mut start_byte = 0;
        let mut start_char = 0;

        // Byte positions of every chunk_size-th character boundary.
        let boundaries = text
            .char_indices()
            .map(|(byte, _)| byte)
            .skip(self.chunk_size)
            .step_by(self.chunk_size)
            .chain(std::iter::once(text.len()));

        for end_byte in boundaries {
            if end_byte == start_byte {
                continue;
            }
            fragments.push(Fragment::new(
                &text[start_byte..end_byte],
                source.clone(),
                start_char,
            ));
            start_byte = end_byte;
            start_char += self.chunk_size;
        }

        debug!(
            "Chunked {} bytes into {} fragments (chunk size {})",
            text.len(),
            fragments.len(),
            self.chunk_size
        );

        fragments
    }
}

/// Split `text` into fragments of at most `chunk_size` characters.
pub fn chunk(text: &str, chunk_size: usize, source: &SourceId) -> Result<Vec<Fragment>> {
    Ok(Chunker::new(chunk_size)?.chunk(text, source))
}
