use std::fs;
use std::path::Path;
use tempfile::TempDir;

use campusrag_core::loader::load_documents;
use campusrag_core::splitter::TextSplitter;
use campusrag_core::traits::Retriever;
use campusrag_embed::get_default_embedder;
use campusrag_vector::{FlatIndex, VectorSearchEngine};

const FAKE_DIM: usize = 256;

fn embedder() -> Box<dyn campusrag_embed::Embedder> {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    get_default_embedder(Path::new("models/unused"), "bge-m3", FAKE_DIM).expect("embedder")
}

#[test]
fn ingest_then_query_retrieves_the_paris_chunk() {
    let data = TempDir::new().expect("data dir");
    fs::write(
        data.path().join("facts.txt"),
        "Paris is the capital of France. Lyon is a large city.",
    )
    .expect("write");

    let docs = load_documents(data.path()).expect("load");
    assert_eq!(docs.len(), 1);

    let splitter = TextSplitter::new(40, 5).expect("splitter");
    let chunks = splitter.split_documents(&docs);
    assert!(
        chunks.iter().any(|c| c.content.contains("Paris is the capital of France")),
        "ingest must produce a chunk with the full first sentence"
    );

    let index = FlatIndex::build(embedder().as_ref(), &chunks).expect("build");
    let index_dir = TempDir::new().expect("index dir");
    index.save(index_dir.path()).expect("save");

    let engine = VectorSearchEngine::open(index_dir.path(), embedder()).expect("open");
    let results = engine.retrieve("What is the capital of France?", 1).expect("search");
    assert_eq!(results.len(), 1, "k=1 returns exactly one hit");
    assert!(
        results[0].content.contains("Paris is the capital of France"),
        "top hit must be the Paris chunk, got: {:?}",
        results[0].content
    );
    assert_eq!(results[0].doc_id, "facts");
}

#[test]
fn retrieval_never_exceeds_the_stored_chunk_count() {
    let data = TempDir::new().expect("data dir");
    fs::write(data.path().join("one.txt"), "A single short document.").expect("write");

    let docs = load_documents(data.path()).expect("load");
    let chunks = TextSplitter::new(1000, 150).expect("splitter").split_documents(&docs);
    assert_eq!(chunks.len(), 1);

    let index = FlatIndex::build(embedder().as_ref(), &chunks).expect("build");
    let engine =
        VectorSearchEngine::from_parts(index, embedder()).expect("engine");
    let results = engine.search("anything at all", 5).expect("search");
    assert_eq!(results.len(), 1, "min(k, stored) results come back");
}
