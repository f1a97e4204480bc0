//! Prompt assembly.

use finsight_retrieval::RetrievalResult;

/// Join the retrieved texts (closest first) under a `Context:` heading and
/// append the question under `Question:`.
pub fn build_prompt(context: &RetrievalResult, question: &str) -> String {
    format!(
        "Context:\n{}\n\nQuestion: {question}",
        context.texts().join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsight_embeddings::HashingProvider;
    use finsight_retrieval::{Corpus, Fragment, SourceId, SubjectId, retrieve};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_prompt_layout() {
        let subject = SubjectId::new("TSLA");
        let corpus = Corpus::from_fragments(
            subject.clone(),
            vec![Fragment::new(
                "Tesla designs electric vehicles.",
                SourceId::Summary { subject },
                0,
            )],
        );
        let context = retrieve("outlook", &corpus, &HashingProvider::default(), 3)
            .await
            .unwrap();

        assert_eq!(
            build_prompt(&context, "What is Tesla's outlook?"),
            "Context:\nTesla designs electric vehicles.\n\nQuestion: What is Tesla's outlook?"
        );
    }

    #[test]
    fn test_empty_context() {
        assert_eq!(
            build_prompt(&RetrievalResult::default(), "Why?"),
            "Context:\n\n\nQuestion: Why?"
        );
    }
}
