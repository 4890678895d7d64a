use campusrag_embed::{Embedder, FakeEmbedder};

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(256);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 256, "embedding dim matches construction");
    assert_eq!(embedder.dim(), 256);

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn different_texts_embed_differently() {
    let embedder = FakeEmbedder::new(128);
    let embs = embedder
        .embed_batch(&["alpha beta".to_string(), "gamma delta".to_string()])
        .expect("embed_batch");
    assert_ne!(embs[0], embs[1]);
}

#[test]
fn embedder_id_carries_model_and_dimension() {
    let embedder = FakeEmbedder::new(64);
    assert_eq!(embedder.id(), "fake:xxhash:d64");
}

#[test]
fn env_switch_selects_fake_embedder() {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    let embedder = campusrag_embed::get_default_embedder(
        std::path::Path::new("models/does-not-exist"),
        "bge-m3",
        512,
    )
    .expect("embedder");
    assert_eq!(embedder.dim(), 512);
    assert_eq!(embedder.id(), "fake:xxhash:d512");
}
