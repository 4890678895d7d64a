use anyhow::{anyhow, Result};
use std::path::Path;

use campusrag_core::error::Error;
use campusrag_core::traits::{Embedder, Retriever};
use campusrag_core::types::SearchResult;

use crate::index::FlatIndex;

/// A loaded index paired with the embedder that queries it. Construction
/// verifies that the embedder matches the one the index was built with;
/// a mismatch would make every similarity score meaningless, so it is
/// rejected up front instead of producing silently wrong answers.
pub struct VectorSearchEngine {
    index: FlatIndex,
    embedder: Box<dyn Embedder>,
}

impl std::fmt::Debug for VectorSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorSearchEngine")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl VectorSearchEngine {
    pub fn open(index_dir: &Path, embedder: Box<dyn Embedder>) -> Result<Self> {
        let index = FlatIndex::load(index_dir)?;
        Self::from_parts(index, embedder)
    }

    /// Pair an in-memory index with an embedder, applying the same
    /// identity check as [`Self::open`].
    pub fn from_parts(index: FlatIndex, embedder: Box<dyn Embedder>) -> Result<Self> {
        let meta = index.meta();
        if meta.embedder_id != embedder.id() || meta.dim != embedder.dim() {
            return Err(Error::EmbedderMismatch {
                index: format!("{} (dim {})", meta.embedder_id, meta.dim),
                configured: format!("{} (dim {})", embedder.id(), embedder.dim()),
            }
            .into());
        }
        Ok(Self { index, embedder })
    }

    /// Embed `query_text` and return the `k` nearest chunks.
    pub fn search(&self, query_text: &str, k: usize) -> Result<Vec<SearchResult>> {
        tracing::debug!(query = query_text, k, "vector search");
        let mut vectors = self.embedder.embed_batch(&[query_text.to_string()])?;
        let query_vec = vectors
            .pop()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
        self.index.search_vec(&query_vec, k)
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }
}

impl Retriever for VectorSearchEngine {
    fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        self.search(query, k)
    }
}
