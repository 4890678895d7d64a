use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use campusrag_core::error::Error;
use campusrag_core::traits::Embedder;
use campusrag_core::types::{DocumentChunk, SearchResult};

pub const META_FILE: &str = "meta.json";
pub const CHUNKS_FILE: &str = "chunks.json";

const EMBED_BATCH: usize = 32;

/// One stored chunk together with its embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub doc_id: String,
    pub doc_path: String,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub vector: Vec<f32>,
}

/// Index identity. `embedder_id`/`dim` must match the embedder configured
/// at query time; see [`crate::VectorSearchEngine::open`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub embedder_id: String,
    pub dim: usize,
    pub chunk_count: usize,
    pub created_at: String,
}

/// Immutable-once-built vector index over document chunks.
#[derive(Debug)]
pub struct FlatIndex {
    meta: IndexMeta,
    records: Vec<IndexRecord>,
}

impl FlatIndex {
    /// Embed every chunk and build the index. Building from zero chunks is
    /// an error: an empty index would silently answer every query with
    /// nothing.
    pub fn build(embedder: &dyn Embedder, chunks: &[DocumentChunk]) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::Operation(
                "refusing to build a vector index from zero chunks".to_string(),
            )
            .into());
        }

        println!("🔢 Embedding {} chunks...", chunks.len());
        let pb = ProgressBar::new(chunks.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let dim = embedder.dim();
        let mut records = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = embedder.embed_batch(&texts)?;
            for (chunk, vector) in batch.iter().zip(vectors) {
                if vector.len() != dim {
                    return Err(Error::Operation(format!(
                        "embedder '{}' produced a {}-dim vector, expected {}",
                        embedder.id(),
                        vector.len(),
                        dim
                    ))
                    .into());
                }
                records.push(IndexRecord {
                    id: chunk.id.clone(),
                    doc_id: chunk.doc_id.clone(),
                    doc_path: chunk.doc_path.clone(),
                    content: chunk.content.clone(),
                    chunk_index: chunk.chunk_index,
                    total_chunks: chunk.total_chunks,
                    vector,
                });
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        let meta = IndexMeta {
            embedder_id: embedder.id().to_string(),
            dim,
            chunk_count: records.len(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        tracing::info!(chunks = records.len(), embedder = %meta.embedder_id, "index built");
        Ok(Self { meta, records })
    }

    /// Return the `k` stored chunks nearest to `query_vec` by cosine
    /// similarity, most similar first. Equal scores keep insertion order.
    pub fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query_vec.len() != self.meta.dim {
            return Err(Error::InvalidConfig(format!(
                "query vector has dim {}, index has dim {}",
                query_vec.len(),
                self.meta.dim
            ))
            .into());
        }
        if k == 0 {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(f32, &IndexRecord)> = self
            .records
            .iter()
            .map(|r| (cosine_similarity(query_vec, &r.vector), r))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, r)| SearchResult {
                score,
                id: r.id.clone(),
                doc_id: r.doc_id.clone(),
                path: r.doc_path.clone(),
                content: r.content.clone(),
            })
            .collect())
    }

    /// Persist the index under `dir` (created if absent).
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(META_FILE), serde_json::to_string_pretty(&self.meta)?)?;
        fs::write(dir.join(CHUNKS_FILE), serde_json::to_string(&self.records)?)?;
        tracing::info!(dir = %dir.display(), chunks = self.records.len(), "index saved");
        Ok(())
    }

    /// Load a previously saved index. A missing index directory is
    /// `Error::NotFound` so callers can tell "ingest has not run" apart
    /// from a corrupt index.
    pub fn load(dir: &Path) -> Result<Self> {
        let meta_path = dir.join(META_FILE);
        if !meta_path.is_file() {
            return Err(Error::NotFound(format!(
                "no vector index at '{}' (run ingest first)",
                dir.display()
            ))
            .into());
        }
        let meta: IndexMeta = serde_json::from_str(&fs::read_to_string(&meta_path)?)?;
        let records: Vec<IndexRecord> =
            serde_json::from_str(&fs::read_to_string(dir.join(CHUNKS_FILE))?)?;
        if records.len() != meta.chunk_count {
            return Err(Error::Operation(format!(
                "index at '{}' is corrupt: meta says {} chunks, found {}",
                dir.display(),
                meta.chunk_count,
                records.len()
            ))
            .into());
        }
        Ok(Self { meta, records })
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
