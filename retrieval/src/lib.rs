//! # Retrieval
//!
//! The retrieval core: turn a subject's fetched text into an ordered corpus
//! of fragments, embed and index it, and pick the fragments nearest a query.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Retrieval Pipeline                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  SummaryFetcher ─┐                                              │
//! │                  ├─► CorpusBuilder ──► Corpus                   │
//! │  NewsFetcher ────┘        │               │                     │
//! │                        Chunker            ▼                     │
//! │                                      Retriever                  │
//! │                                  (embed ► index ► search)       │
//! │                                           │                     │
//! │                                           ▼                     │
//! │                                   RetrievalResult               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finsight_retrieval::{CorpusBuilder, Retriever, SubjectId};
//!
//! let corpus = CorpusBuilder::new(300)?
//!     .build(&SubjectId::new("TSLA"), &summaries, &news)
//!     .await?;
//! let context = Retriever::new(embedder, 3)?
//!     .retrieve("What is Tesla's outlook?", &corpus)
//!     .await?;
//! ```

pub mod chunker;
pub mod config;
pub mod corpus;
pub mod error;
pub mod retriever;

pub use chunker::{Chunker, Fragment, SourceId, SubjectId, chunk};
pub use config::RetrievalConfig;
pub use corpus::{Corpus, CorpusBuilder, NewsFetcher, SummaryFetcher};
pub use error::{CollaboratorError, Result, RetrievalError, SourceKind};
pub use retriever::{RetrievalResult, Retriever, ScoredFragment, index_corpus, retrieve};

// Re-export from dependencies for convenience
pub use finsight_embeddings::{EmbeddingProvider, VectorIndex};
