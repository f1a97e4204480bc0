//! # Answer
//!
//! Answers free-text questions about a company. The question names the
//! company; its summary and recent news are fetched, chunked, embedded, and
//! the fragments nearest the question are handed to a chat model as context.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     AnswerOrchestrator                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  question ──► SubjectResolver ──► CorpusBuilder ──► Retriever   │
//! │                                                         │       │
//! │                                                         ▼       │
//! │          Answer ◄── Generator ◄── build_prompt ◄── context      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finsight_answer::{AnswerConfig, AnswerOrchestrator};
//!
//! let config = AnswerConfig::load("finsight.toml")?;
//! let orchestrator = AnswerOrchestrator::builder()
//!     .with_config(&config)?
//!     .with_summary_fetcher(summaries)
//!     .with_news_fetcher(news)
//!     .build()?;
//!
//! match orchestrator.answer("What is Tesla's outlook?").await {
//!     Ok(answer) => println!("{}", answer.text),
//!     Err(err) => println!("{}", err.user_message()),
//! }
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod prompt;
pub mod subject;

pub use config::{AnswerConfig, EmbeddingConfig, EmbeddingProviderType, GenerationConfig};
pub use error::{AnswerError, ConfigError, FailureReason, Result};
pub use generator::{ChatCompletionsGenerator, GenerationError, Generator};
pub use orchestrator::{
    Answer, AnswerOrchestrator, AnswerOrchestratorBuilder, AnswerState, StateObserver,
};
pub use prompt::build_prompt;
pub use subject::{CompanyDirectory, CompanyEntry, DirectoryResolver, Resolution, SubjectResolver};

pub use finsight_retrieval::{NewsFetcher, SubjectId, SummaryFetcher};
