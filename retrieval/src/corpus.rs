//! Per-question corpus construction.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::chunker::{Chunker, Fragment, SourceId, SubjectId};
use crate::error::{CollaboratorError, Result, RetrievalError, SourceKind};

/// Fetches a subject's descriptive summary.
///
/// Implementations may return a placeholder string when the source has no
/// content; it is chunked like any other text.
#[async_trait]
pub trait SummaryFetcher: Send + Sync {
    async fn fetch_summary(
        &self,
        subject: &SubjectId,
    ) -> std::result::Result<String, CollaboratorError>;
}

/// Fetches recent news items, each already combined into one string.
#[async_trait]
pub trait NewsFetcher: Send + Sync {
    async fn fetch_news(
        &self,
        subject: &SubjectId,
    ) -> std::result::Result<Vec<String>, CollaboratorError>;
}

/// The ordered fragments built for one question.
///
/// A fragment's position in this sequence is its position in any index
/// built from it, so the sequence cannot be reordered or edited once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    subject: SubjectId,
    fragments: Vec<Fragment>,
}

impl Corpus {
    /// Wrap an already-ordered fragment list.
    pub fn from_fragments(subject: SubjectId, fragments: Vec<Fragment>) -> Self {
        Self { subject, fragments }
    }

    /// The subject this corpus was built for.
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Check if the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragment at `position`.
    pub fn get(&self, position: usize) -> Option<&Fragment> {
        self.fragments.get(position)
    }

    /// Iterate fragments in corpus order.
    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.fragments.iter()
    }

    /// Fragment texts in corpus order, ready for embedding.
    pub fn texts(&self) -> Vec<String> {
        self.fragments.iter().map(|f| f.text().to_string()).collect()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Fetches, chunks and orders the text for one subject.
#[derive(Debug, Clone, Copy)]
pub struct CorpusBuilder {
    chunker: Chunker,
}

impl CorpusBuilder {
    /// Create a builder that cuts text into `chunk_size`-character fragments.
    pub fn new(chunk_size: usize) -> Result<Self> {
        Ok(Self {
            chunker: Chunker::new(chunk_size)?,
        })
    }

    /// Create a builder from an existing chunker.
    pub fn with_chunker(chunker: Chunker) -> Self {
        Self { chunker }
    }

    /// Build the corpus for `subject`.
    ///
    /// Each fetcher is called exactly once; the two calls run concurrently.
    /// Summary fragments come first, then each news item's fragments in feed
    /// order. Fetch failures are returned as
    /// [`RetrievalError::SourceUnavailable`], never replaced with empty text.
    pub async fn build(
        &self,
        subject: &SubjectId,
        summary: &dyn SummaryFetcher,
        news: &dyn NewsFetcher,
    ) -> Result<Corpus> {
        let (summary_text, news_items) =
            tokio::join!(summary.fetch_summary(subject), news.fetch_news(subject));

        let summary_text = summary_text.map_err(|cause| RetrievalError::SourceUnavailable {
            kind: SourceKind::Summary,
            cause,
        })?;
        let news_items = news_items.map_err(|cause| RetrievalError::SourceUnavailable {
            kind: SourceKind::News,
            cause,
        })?;

        let mut fragments = self.chunker.chunk(
            &summary_text,
            &SourceId::Summary {
                subject: subject.clone(),
            },
        );
        let summary_count = fragments.len();

        for (item, text) in news_items.iter().enumerate() {
            let source = SourceId::News {
                subject: subject.clone(),
                item,
            };
            fragments.extend(self.chunker.chunk(text, &source));
        }

        debug!(
            "Corpus for {subject}: {summary_count} summary fragments, {} news fragments from {} items",
            fragments.len() - summary_count,
            news_items.len()
        );
        info!("Built corpus of {} fragments for {subject}", fragments.len());

        Ok(Corpus::from_fragments(subject.clone(), fragments))
    }
}
