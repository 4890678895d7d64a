use anyhow::Result;

use campusrag_core::traits::{CompletionProvider, Retriever};
use campusrag_core::types::Completion;
use campusrag_llm::build_prompt;

/// The application context for answering questions: retriever, completion
/// provider and the retrieval depth, constructed once at startup and
/// passed to whoever drives questions through it.
pub struct AnswerPipeline<R: Retriever, C: CompletionProvider> {
    retriever: R,
    provider: C,
    top_k: usize,
}

impl<R: Retriever, C: CompletionProvider> AnswerPipeline<R, C> {
    pub fn new(retriever: R, provider: C, top_k: usize) -> Self {
        Self { retriever, provider, top_k: top_k.max(1) }
    }

    /// Run one question end to end: retrieve the top-k chunks, assemble
    /// the prompt, call the completion service.
    pub async fn answer(&self, question: &str) -> Result<Completion> {
        let hits = self.retriever.retrieve(question, self.top_k)?;
        tracing::debug!(hits = hits.len(), "retrieved context");
        let context: Vec<String> = hits.into_iter().map(|h| h.content).collect();
        let prompt = build_prompt(&context, question);
        self.provider.generate(&prompt).await
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}
