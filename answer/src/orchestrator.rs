//! Question answering flow.
//!
//! ```text
//! ResolvingSubject ─► BuildingCorpus ─► Retrieving ─► Generating ─► Done
//!        │                  │               │             │
//!        └──────────────────┴───────┬───────┴─────────────┘
//!                                   ▼
//!                           Failed(FailureReason)
//! ```
//!
//! Each stage runs once; a failure ends the request. The orchestrator holds
//! no per-request state, so one instance can answer many questions
//! concurrently.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use finsight_embeddings::EmbeddingProvider;
use finsight_retrieval::{
    CorpusBuilder, NewsFetcher, RetrievalConfig, RetrievalError, RetrievalResult, Retriever,
    SubjectId, SummaryFetcher,
};

use crate::config::AnswerConfig;
use crate::error::{AnswerError, ConfigError, FailureReason, Result};
use crate::generator::{ChatCompletionsGenerator, Generator};
use crate::prompt::build_prompt;
use crate::subject::{DirectoryResolver, SubjectResolver};

/// Stage of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerState {
    ResolvingSubject,
    BuildingCorpus,
    Retrieving,
    Generating,
    Done,
    Failed(FailureReason),
}

/// Callback invoked on every state transition.
pub type StateObserver = Arc<dyn Fn(&AnswerState) + Send + Sync>;

/// A successful answer.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Generated answer text.
    pub text: String,

    /// The resolved subject.
    pub subject: SubjectId,

    /// Display name of the subject, when the resolver gave one.
    pub display_name: Option<String>,

    /// Fragments the answer was conditioned on, closest first.
    pub context: RetrievalResult,
}

/// Ties subject resolution, corpus construction, retrieval and generation
/// together.
pub struct AnswerOrchestrator {
    resolver: Arc<dyn SubjectResolver>,
    summaries: Arc<dyn SummaryFetcher>,
    news: Arc<dyn NewsFetcher>,
    corpus_builder: CorpusBuilder,
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    observer: Option<StateObserver>,
}

impl fmt::Debug for AnswerOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerOrchestrator")
            .field("corpus_builder", &self.corpus_builder)
            .field("top_k", &self.retriever.top_k())
            .finish_non_exhaustive()
    }
}

impl AnswerOrchestrator {
    /// Create a new orchestrator builder.
    pub fn builder() -> AnswerOrchestratorBuilder {
        AnswerOrchestratorBuilder::new()
    }

    /// Answer `question`, or report which stage failed.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        debug!("Processing question: {question}");

        self.transition(AnswerState::ResolvingSubject);
        let resolution = self.resolver.resolve(question).await;
        let Some(subject) = resolution.subject else {
            return Err(self.fail(AnswerError::NoSubjectIdentified));
        };
        info!(
            "Answering question about {subject} ({})",
            resolution.display_name.as_deref().unwrap_or("unnamed")
        );

        self.transition(AnswerState::BuildingCorpus);
        let corpus = self
            .corpus_builder
            .build(&subject, self.summaries.as_ref(), self.news.as_ref())
            .await
            .map_err(|err| match err {
                RetrievalError::SourceUnavailable { .. } => AnswerError::SourceUnavailable(err),
                other => AnswerError::Retrieval(other),
            })
            .map_err(|err| self.fail(err))?;

        self.transition(AnswerState::Retrieving);
        let context = self
            .retriever
            .retrieve(question, &corpus)
            .await
            .map_err(|err| match err {
                RetrievalError::EmptyCorpus => AnswerError::NoContextAvailable {
                    subject: subject.clone(),
                },
                other => AnswerError::Retrieval(other),
            })
            .map_err(|err| self.fail(err))?;

        self.transition(AnswerState::Generating);
        let prompt = build_prompt(&context, question);
        let text = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|err| self.fail(AnswerError::Generation(err)))?;

        self.transition(AnswerState::Done);
        Ok(Answer {
            text,
            subject,
            display_name: resolution.display_name,
            context,
        })
    }

    fn transition(&self, state: AnswerState) {
        debug!("Answer state: {state:?}");
        if let Some(observer) = &self.observer {
            observer(&state);
        }
    }

    fn fail(&self, err: AnswerError) -> AnswerError {
        warn!("Question failed: {err}");
        self.transition(AnswerState::Failed(err.reason()));
        err
    }
}

/// Builder for [`AnswerOrchestrator`].
#[derive(Default)]
pub struct AnswerOrchestratorBuilder {
    resolver: Option<Arc<dyn SubjectResolver>>,
    summaries: Option<Arc<dyn SummaryFetcher>>,
    news: Option<Arc<dyn NewsFetcher>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Arc<dyn Generator>>,
    retrieval: RetrievalConfig,
    observer: Option<StateObserver>,
}

impl AnswerOrchestratorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the resolver, embedder, generator and retrieval settings from
    /// `config`. Fetchers still have to be supplied.
    pub fn with_config(mut self, config: &AnswerConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        self.resolver = Some(Arc::new(DirectoryResolver::new(config.directory()?)));
        self.embedder = Some(config.embedder()?);
        self.generator = Some(Arc::new(ChatCompletionsGenerator::from_config(
            &config.generation,
        )));
        self.retrieval = config.retrieval.clone();
        Ok(self)
    }

    /// Set the subject resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn SubjectResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Set the summary fetcher.
    pub fn with_summary_fetcher(mut self, fetcher: Arc<dyn SummaryFetcher>) -> Self {
        self.summaries = Some(fetcher);
        self
    }

    /// Set the news fetcher.
    pub fn with_news_fetcher(mut self, fetcher: Arc<dyn NewsFetcher>) -> Self {
        self.news = Some(fetcher);
        self
    }

    /// Set the shared embedder.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the generation collaborator.
    pub fn with_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set chunk size and `k`.
    pub fn with_retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.retrieval = retrieval;
        self
    }

    /// Observe every state transition.
    pub fn with_observer(mut self, observer: StateObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> std::result::Result<AnswerOrchestrator, ConfigError> {
        self.retrieval.validate()?;
        let embedder = self.embedder.ok_or(ConfigError::Missing("embedder"))?;

        Ok(AnswerOrchestrator {
            resolver: self.resolver.ok_or(ConfigError::Missing("subject resolver"))?,
            summaries: self.summaries.ok_or(ConfigError::Missing("summary fetcher"))?,
            news: self.news.ok_or(ConfigError::Missing("news fetcher"))?,
            corpus_builder: CorpusBuilder::new(self.retrieval.chunk_size)?,
            retriever: Retriever::new(embedder, self.retrieval.top_k)?,
            generator: self.generator.ok_or(ConfigError::Missing("generator"))?,
            observer: self.observer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::{CompanyDirectory, CompanyEntry, Resolution};
    use async_trait::async_trait;
    use finsight_embeddings::HashingProvider;
    use finsight_retrieval::CollaboratorError;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct FixedSummary(&'static str);

    #[async_trait]
    impl SummaryFetcher for FixedSummary {
        async fn fetch_summary(
            &self,
            _subject: &SubjectId,
        ) -> std::result::Result<String, CollaboratorError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingSummary;

    #[async_trait]
    impl SummaryFetcher for FailingSummary {
        async fn fetch_summary(
            &self,
            _subject: &SubjectId,
        ) -> std::result::Result<String, CollaboratorError> {
            Err("connection reset".into())
        }
    }

    struct FixedNews(Vec<&'static str>);

    #[async_trait]
    impl NewsFetcher for FixedNews {
        async fn fetch_news(
            &self,
            _subject: &SubjectId,
        ) -> std::result::Result<Vec<String>, CollaboratorError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> std::result::Result<String, CollaboratorError> {
            Ok(format!("answer to: {prompt}"))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, CollaboratorError> {
            Err("request timed out".into())
        }
    }

    struct NoneResolver;

    #[async_trait]
    impl SubjectResolver for NoneResolver {
        async fn resolve(&self, _question: &str) -> Resolution {
            Resolution::none()
        }
    }

    fn resolver() -> Arc<dyn SubjectResolver> {
        Arc::new(DirectoryResolver::new(
            CompanyDirectory::new([CompanyEntry::new("Tesla", "TSLA")]).unwrap(),
        ))
    }

    fn builder() -> AnswerOrchestratorBuilder {
        AnswerOrchestrator::builder()
            .with_resolver(resolver())
            .with_summary_fetcher(Arc::new(FixedSummary("Tesla makes electric cars.")))
            .with_news_fetcher(Arc::new(FixedNews(vec!["Tesla opens a new factory."])))
            .with_embedder(Arc::new(HashingProvider::default()))
            .with_generator(Arc::new(EchoGenerator))
    }

    fn recording(
        builder: AnswerOrchestratorBuilder,
    ) -> (AnswerOrchestrator, Arc<Mutex<Vec<AnswerState>>>) {
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        let orchestrator = builder
            .with_observer(Arc::new(move |state: &AnswerState| {
                sink.lock().unwrap().push(*state);
            }))
            .build()
            .unwrap();
        (orchestrator, states)
    }

    #[tokio::test]
    async fn test_happy_path_visits_every_state() {
        let (orchestrator, states) = recording(builder());

        let answer = orchestrator.answer("What is Tesla's outlook?").await.unwrap();

        assert_eq!(answer.subject, SubjectId::new("TSLA"));
        assert_eq!(answer.display_name.as_deref(), Some("Tesla"));
        assert_eq!(answer.context.len(), 2);
        assert!(answer.text.starts_with("answer to: Context:\n"));
        assert!(answer.text.ends_with("\n\nQuestion: What is Tesla's outlook?"));
        assert_eq!(
            *states.lock().unwrap(),
            vec![
                AnswerState::ResolvingSubject,
                AnswerState::BuildingCorpus,
                AnswerState::Retrieving,
                AnswerState::Generating,
                AnswerState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_no_subject() {
        let (orchestrator, states) = recording(builder().with_resolver(Arc::new(NoneResolver)));

        let err = orchestrator.answer("Anything").await.unwrap_err();
        assert_eq!(err.reason(), FailureReason::NoSubjectIdentified);
        assert_eq!(
            states.lock().unwrap().last().copied(),
            Some(AnswerState::Failed(FailureReason::NoSubjectIdentified))
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_source_unavailable() {
        let (orchestrator, states) =
            recording(builder().with_summary_fetcher(Arc::new(FailingSummary)));

        let err = orchestrator.answer("Tesla news?").await.unwrap_err();
        assert_eq!(err.reason(), FailureReason::SourceUnavailable);
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(
            *states.lock().unwrap(),
            vec![
                AnswerState::ResolvingSubject,
                AnswerState::BuildingCorpus,
                AnswerState::Failed(FailureReason::SourceUnavailable),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_sources_mean_no_context() {
        let (orchestrator, _) = recording(
            builder()
                .with_summary_fetcher(Arc::new(FixedSummary("")))
                .with_news_fetcher(Arc::new(FixedNews(Vec::new()))),
        );

        let err = orchestrator.answer("Tesla?").await.unwrap_err();
        assert!(matches!(
            err,
            AnswerError::NoContextAvailable { ref subject } if subject.as_str() == "TSLA"
        ));
        assert_eq!(err.reason(), FailureReason::NoContextAvailable);
    }

    #[tokio::test]
    async fn test_generation_failure() {
        let (orchestrator, states) =
            recording(builder().with_generator(Arc::new(FailingGenerator)));

        let err = orchestrator.answer("Tesla?").await.unwrap_err();
        assert_eq!(err.reason(), FailureReason::GenerationError);
        assert_eq!(err.user_message(), "The answer could not be generated.");
        assert_eq!(
            states.lock().unwrap().last().copied(),
            Some(AnswerState::Failed(FailureReason::GenerationError))
        );
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let result = AnswerOrchestrator::builder()
            .with_resolver(resolver())
            .with_embedder(Arc::new(HashingProvider::default()))
            .build();
        assert!(matches!(result, Err(ConfigError::Missing("summary fetcher"))));

        let result = builder()
            .with_retrieval(RetrievalConfig::default().with_top_k(0))
            .build();
        assert!(matches!(result, Err(ConfigError::Retrieval(_))));
    }

    #[test]
    fn test_with_config_wires_hashing_embedder() {
        let config = AnswerConfig::from_toml_str(
            "[embedding]\nprovider = \"hashing\"\n[retrieval]\ntop_k = 2\n",
        )
        .unwrap();

        let orchestrator = AnswerOrchestrator::builder()
            .with_config(&config)
            .unwrap()
            .with_summary_fetcher(Arc::new(FixedSummary("s")))
            .with_news_fetcher(Arc::new(FixedNews(Vec::new())))
            .build()
            .unwrap();
        assert_eq!(orchestrator.retriever.top_k(), 2);
    }
}
