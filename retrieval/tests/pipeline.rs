//! Integration tests for corpus construction and retrieval.

use std::sync::Arc;

use async_trait::async_trait;
use finsight_embeddings::HashingProvider;
use finsight_retrieval::{
    CollaboratorError, CorpusBuilder, NewsFetcher, RetrievalError, Retriever, SourceId,
    SubjectId, SummaryFetcher,
};
use pretty_assertions::assert_eq;

struct Summary(String);

#[async_trait]
impl SummaryFetcher for Summary {
    async fn fetch_summary(&self, _subject: &SubjectId) -> Result<String, CollaboratorError> {
        Ok(self.0.clone())
    }
}

struct News(Vec<String>);

#[async_trait]
impl NewsFetcher for News {
    async fn fetch_news(&self, _subject: &SubjectId) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn test_nine_hundred_char_summary_and_two_items() {
    let subject = SubjectId::new("TSLA");
    let summary = Summary("s".repeat(900));
    let news = News(vec!["a".repeat(50), "b".repeat(50)]);

    let corpus = CorpusBuilder::new(300)
        .unwrap()
        .build(&subject, &summary, &news)
        .await
        .unwrap();

    assert_eq!(corpus.len(), 5);
    let layout: Vec<(SourceId, usize, usize)> = corpus
        .iter()
        .map(|f| (f.source().clone(), f.offset(), f.char_len()))
        .collect();
    let summary_source = SourceId::Summary {
        subject: subject.clone(),
    };
    assert_eq!(
        layout,
        vec![
            (summary_source.clone(), 0, 300),
            (summary_source.clone(), 300, 300),
            (summary_source, 600, 300),
            (
                SourceId::News {
                    subject: subject.clone(),
                    item: 0
                },
                0,
                50
            ),
            (
                SourceId::News {
                    subject: subject.clone(),
                    item: 1
                },
                0,
                50
            ),
        ]
    );

    let retriever = Retriever::new(Arc::new(HashingProvider::default()), 3).unwrap();
    let result = retriever.retrieve("What is Tesla's outlook?", &corpus).await.unwrap();
    assert_eq!(result.len(), 3);
    assert!(
        result
            .iter()
            .zip(result.iter().skip(1))
            .all(|(a, b)| a.distance <= b.distance)
    );
}

#[tokio::test]
async fn test_relevant_news_ranks_first() {
    let subject = SubjectId::new("AAPL");
    let summary = Summary("Apple designs smartphones, tablets and wearables.".to_string());
    let news = News(vec![
        "Apple announces a record share buyback program.".to_string(),
        "Supply chain delays hit wearables shipments.".to_string(),
    ]);

    let corpus = CorpusBuilder::new(300)
        .unwrap()
        .build(&subject, &summary, &news)
        .await
        .unwrap();

    let retriever = Retriever::new(Arc::new(HashingProvider::default()), 1).unwrap();
    let result = retriever
        .retrieve("How large is the share buyback?", &corpus)
        .await
        .unwrap();

    assert_eq!(
        result.texts(),
        vec!["Apple announces a record share buyback program."]
    );
}

#[tokio::test]
async fn test_same_question_same_ranking() {
    let subject = SubjectId::new("NVDA");
    let summary = Summary("Nvidia sells GPUs for gaming and data centers. ".repeat(20));
    let news = News(vec!["Data center revenue doubled.".to_string()]);
    let corpus = CorpusBuilder::new(120)
        .unwrap()
        .build(&subject, &summary, &news)
        .await
        .unwrap();

    let retriever = Retriever::new(Arc::new(HashingProvider::default()), 4).unwrap();
    let first = retriever.retrieve("data center growth", &corpus).await.unwrap();
    let second = retriever.retrieve("data center growth", &corpus).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_blank_sources_give_empty_corpus() {
    let subject = SubjectId::new("META");
    let corpus = CorpusBuilder::new(300)
        .unwrap()
        .build(&subject, &Summary(String::new()), &News(vec![String::new()]))
        .await
        .unwrap();
    assert!(corpus.is_empty());

    let retriever = Retriever::new(Arc::new(HashingProvider::default()), 3).unwrap();
    assert!(matches!(
        retriever.retrieve("anything", &corpus).await,
        Err(RetrievalError::EmptyCorpus)
    ));
}
