//! # Embeddings
//!
//! Text embedding and nearest-neighbour search for the finsight retrieval
//! pipeline.
//!
//! ## Features
//!
//! - **Embedding Generation**: Convert text to dense vectors (hosted or offline)
//! - **Vector Index**: Exact squared-L2 search with deterministic tie-breaks
//! - **Caching**: Memoise embeddings for repeated fragments and queries
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► Vec<Embedding> ──► VectorIndex           │
//! │       │                                       │                 │
//! │       ▼                                       ▼                 │
//! │  OpenAI/Hashing/Cached                  Vec<Neighbor>           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod error;
pub mod index;
pub mod provider;
pub mod similarity;

pub use cache::CachedProvider;
pub use error::{EmbeddingError, Result};
pub use index::{Neighbor, VectorIndex};
pub use provider::{EmbeddingProvider, HashingProvider, OpenAIProvider};
pub use similarity::{cosine_similarity, normalize, squared_l2};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension of embeddings (varies by model).
pub const DEFAULT_DIMENSION: usize = 1536; // OpenAI text-embedding-3-small
