//! Flat vector index: build, persist, load, k-nearest-neighbor search.
//!
//! Chunks and their embedding vectors are kept as a plain record list and
//! scanned exactly at query time; the index directory holds `meta.json`
//! (embedder identity, dimension) next to `chunks.json` so a mismatched
//! embedder is rejected before any vector is deserialized into a query.

mod index;
mod search;

pub use index::{FlatIndex, IndexMeta, IndexRecord, CHUNKS_FILE, META_FILE};
pub use search::VectorSearchEngine;
