//! Domain types shared by the ingestion and query pipelines.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub type ChunkId = String;

/// A source file loaded into memory during ingestion.
#[derive(Debug, Clone)]
pub struct Document {
    /// Stable document identity (file stem).
    pub doc_id: String,
    pub path: PathBuf,
    pub text: String,
}

/// A chunk of a source document that is independently indexed.
///
/// - `id`: `"{doc_id}:{chunk_index}"`, unique within one ingestion run
/// - `content`: the text payload of the chunk
/// - `chunk_index`/`total_chunks`: position within the parent document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub doc_id: String,
    pub doc_path: String,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// One retrieval hit. `score` is a cosine similarity; higher is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: f32,
    pub id: ChunkId,
    pub doc_id: String,
    pub path: String,
    pub content: String,
}

/// Outcome of one completion call.
///
/// `Text` carries the model's extracted answer. `Degraded` carries the raw
/// response representation when the service replied without extractable
/// text; it is a successful call, not an error, and callers can branch on
/// the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    Degraded(String),
}

impl Completion {
    pub fn into_text(self) -> String {
        match self {
            Completion::Text(t) | Completion::Degraded(t) => t,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Completion::Degraded(_))
    }
}
