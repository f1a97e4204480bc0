//! Embedding cache for repeated texts.
//!
//! Company summaries are re-fetched for every question about the same
//! company, so most corpus fragments repeat between requests. Wrapping the
//! provider in [`CachedProvider`] skips the model call for texts it has
//! already seen. The cache lives only as long as the process.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::provider::EmbeddingProvider;

/// Cache entry for an embedding.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The text that was embedded, kept to rule out hash collisions.
    text: String,

    /// The embedding vector.
    embedding: Embedding,

    /// Insertion sequence number, used for oldest-first eviction.
    inserted: u64,
}

/// A provider wrapper that memoizes embeddings by (model, text).
pub struct CachedProvider<P> {
    inner: P,

    /// In-memory cache.
    cache: RwLock<HashMap<u64, CacheEntry>>,

    /// Maximum cache size.
    max_entries: usize,

    sequence: AtomicU64,
}

impl<P: EmbeddingProvider> CachedProvider<P> {
    /// Wrap `inner`, holding at most `max_entries` vectors.
    pub fn new(inner: P, max_entries: usize) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            max_entries,
            sequence: AtomicU64::new(0),
        }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of cached vectors.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Drop every cached vector.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    /// Compute a hash for cache lookup.
    fn hash_key(&self, text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.inner.model().hash(&mut hasher);
        text.hash(&mut hasher);
        hasher.finish()
    }

    async fn insert(&self, text: &str, embedding: Embedding) {
        if self.max_entries == 0 {
            return;
        }

        let key = self.hash_key(text);
        let mut cache = self.cache.write().await;

        // Evict if at capacity
        if cache.len() >= self.max_entries && !cache.contains_key(&key) {
            if let Some(oldest_key) = cache
                .iter()
                .min_by_key(|(_, v)| v.inserted)
                .map(|(k, _)| *k)
            {
                cache.remove(&oldest_key);
            }
        }

        cache.insert(
            key,
            CacheEntry {
                text: text.to_string(),
                embedding,
                inserted: self.sequence.fetch_add(1, Ordering::Relaxed),
            },
        );
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut results: Vec<Option<Embedding>> = Vec::with_capacity(texts.len());
        let mut missing: Vec<String> = Vec::new();

        {
            let cache = self.cache.read().await;
            for text in texts {
                let hit = cache
                    .get(&self.hash_key(text))
                    .filter(|entry| entry.text == *text)
                    .map(|entry| entry.embedding.clone());
                if hit.is_none() {
                    missing.push(text.clone());
                }
                results.push(hit);
            }
        }

        debug!(
            "Embedding cache: {} hits, {} misses",
            texts.len() - missing.len(),
            missing.len()
        );

        if missing.is_empty() {
            return Ok(results.into_iter().flatten().collect());
        }

        let fresh = self.inner.embed(&missing).await?;
        if fresh.len() != missing.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                missing.len(),
                fresh.len()
            )));
        }
        for (text, embedding) in missing.iter().zip(fresh.iter()) {
            self.insert(text, embedding.clone()).await;
        }

        let mut fresh = fresh.into_iter();
        Ok(results
            .into_iter()
            .filter_map(|slot| slot.or_else(|| fresh.next()))
            .collect())
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
