use crate::types::{Completion, SearchResult};

/// Text-to-vector embedding function.
///
/// `id()` is the stable identity persisted into index metadata (model name
/// plus dimension); two embedders with the same id must produce identical
/// vectors for identical input.
pub trait Embedder: Send + Sync {
    fn id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Top-k similarity retrieval over an indexed corpus.
pub trait Retriever: Send + Sync {
    /// Returns at most `k` results, most similar first.
    fn retrieve(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchResult>>;
}

/// A hosted text-completion service.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<Completion>;
}
