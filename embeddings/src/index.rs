//! Exact nearest-neighbour index over embeddings.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::similarity::{common_dimension, squared_l2};

/// A search hit: the insertion position of a stored vector and its squared
/// L2 distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// 0-based insertion position.
    pub position: usize,

    /// Squared euclidean distance to the query.
    pub distance: f32,
}

/// An immutable, brute-force vector index.
///
/// Position `i` always refers to the `i`-th embedding passed to
/// [`VectorIndex::build`]. There is no insert or delete; a changed corpus
/// means a new index.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    /// Stored vectors in insertion order.
    vectors: Vec<Embedding>,

    /// Shared dimension, 0 for an empty index.
    dimension: usize,
}

impl VectorIndex {
    /// Build a fresh index. Every embedding must share one dimension.
    pub fn build(embeddings: Vec<Embedding>) -> Result<Self> {
        let dimension = common_dimension(&embeddings)?.unwrap_or(0);

        debug!(
            "Built vector index with {} entries (dimension {dimension})",
            embeddings.len()
        );

        Ok(Self {
            vectors: embeddings,
            dimension,
        })
    }

    /// Dimension of the stored vectors (0 when empty).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Get the number of entries in the index.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Get a stored vector by position.
    pub fn get(&self, position: usize) -> Option<&Embedding> {
        self.vectors.get(position)
    }

    /// Return the `k` nearest stored vectors, closest first.
    ///
    /// Equal distances are ordered by ascending position. The result holds
    /// `min(k, len)` entries.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if self.vectors.is_empty() {
            return Ok(Vec::new());
        }

        if k == 0 {
            return Err(EmbeddingError::InvalidArgument(
                "k must be positive".to_string(),
            ));
        }

        if query.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| Ok((OrderedFloat(squared_l2(query, v)?), position)))
            .collect::<Result<Vec<(OrderedFloat<f32>, usize)>>>()?;

        // (distance, position) ordering gives the deterministic tie-break.
        let k = k.min(scored.len());
        if k < scored.len() {
            scored.select_nth_unstable(k - 1);
            scored.truncate(k);
        }
        scored.sort_unstable();

        Ok(scored
            .into_iter()
            .map(|(distance, position)| Neighbor {
                position,
                distance: distance.into_inner(),
            })
            .collect())
    }
}
