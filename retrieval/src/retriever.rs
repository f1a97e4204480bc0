//! Top-k retrieval over a corpus.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use finsight_embeddings::{EmbeddingError, EmbeddingProvider, VectorIndex};

use crate::chunker::Fragment;
use crate::corpus::Corpus;
use crate::error::{Result, RetrievalError};

/// A retrieved fragment and its squared L2 distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFragment {
    /// The fragment.
    pub fragment: Fragment,

    /// Squared euclidean distance to the query embedding.
    pub distance: f32,
}

/// Retrieved fragments, closest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalResult {
    hits: Vec<ScoredFragment>,
}

impl RetrievalResult {
    /// Number of retrieved fragments.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Check if nothing was retrieved.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Iterate hits in ascending distance.
    pub fn iter(&self) -> std::slice::Iter<'_, ScoredFragment> {
        self.hits.iter()
    }

    /// Texts of the hits in ascending distance.
    pub fn texts(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.fragment.text()).collect()
    }

    /// Take ownership of the hits.
    pub fn into_hits(self) -> Vec<ScoredFragment> {
        self.hits
    }
}

/// Embeds a corpus, indexes it and returns the fragments nearest a query.
///
/// The embedder is shared; the index is rebuilt for every call and dropped
/// when the call returns.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever returning at most `top_k` fragments.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(RetrievalError::InvalidArgument(
                "k must be positive".to_string(),
            ));
        }
        Ok(Self { embedder, top_k })
    }

    /// Number of fragments returned per query.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The shared embedder.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Embed every fragment of `corpus` and index the vectors by position.
    pub async fn index(&self, corpus: &Corpus) -> Result<VectorIndex> {
        index_corpus(corpus, self.embedder.as_ref()).await
    }

    /// Return the `top_k` fragments of `corpus` nearest to `query`.
    ///
    /// Fails with [`RetrievalError::EmptyCorpus`] when there is nothing to
    /// search.
    pub async fn retrieve(&self, query: &str, corpus: &Corpus) -> Result<RetrievalResult> {
        retrieve(query, corpus, self.embedder.as_ref(), self.top_k).await
    }
}

/// Embed every fragment of `corpus` in order and index the vectors.
///
/// Index position `i` is corpus position `i`.
pub async fn index_corpus(
    corpus: &Corpus,
    embedder: &dyn EmbeddingProvider,
) -> Result<VectorIndex> {
    let embeddings = embedder.embed(&corpus.texts()).await?;
    if embeddings.len() != corpus.len() {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {} embeddings, got {}",
            corpus.len(),
            embeddings.len()
        ))
        .into());
    }
    Ok(VectorIndex::build(embeddings)?)
}

/// Return the `k` fragments of `corpus` nearest to `query` under `embedder`.
pub async fn retrieve(
    query: &str,
    corpus: &Corpus,
    embedder: &dyn EmbeddingProvider,
    k: usize,
) -> Result<RetrievalResult> {
    if k == 0 {
        return Err(RetrievalError::InvalidArgument(
            "k must be positive".to_string(),
        ));
    }
    if corpus.is_empty() {
        return Err(RetrievalError::EmptyCorpus);
    }

    let index = index_corpus(corpus, embedder).await?;
    let query_embedding = embedder.embed_one(query).await?;
    let neighbors = index.search(&query_embedding, k)?;

    debug!(
        "Nearest positions for query: {:?}",
        neighbors.iter().map(|n| n.position).collect::<Vec<_>>()
    );

    let hits = neighbors
        .into_iter()
        .map(|n| -> Result<ScoredFragment> {
            let fragment = corpus.get(n.position).cloned().ok_or_else(|| {
                EmbeddingError::InvalidResponse(format!(
                    "index position {} outside corpus of {}",
                    n.position,
                    corpus.len()
                ))
            })?;
            Ok(ScoredFragment {
                fragment,
                distance: n.distance,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Retrieved {} of {} fragments for {}",
        hits.len(),
        corpus.len(),
        corpus.subject()
    );

    Ok(RetrievalResult { hits })
}
