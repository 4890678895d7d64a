use std::env;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use campusrag_chat::{run_chat_loop, AnswerPipeline};
use campusrag_core::config::{expand_path, Config};
use campusrag_core::loader::load_documents;
use campusrag_core::splitter::{TextSplitter, DEFAULT_MAX_CHARS, DEFAULT_OVERLAP};
use campusrag_core::traits::Embedder;
use campusrag_embed::get_default_embedder;
use campusrag_llm::{GeminiClient, DEFAULT_MODEL};
use campusrag_vector::{FlatIndex, VectorSearchEngine};

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <ingest|chat> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "ingest" => ingest(&config, &args),
        "chat" => chat(&config).await,
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
}

fn configured_embedder(config: &Config) -> anyhow::Result<Box<dyn Embedder>> {
    let model_dir =
        expand_path(config.get_or::<String>("embedding.model_dir", "models/bge-m3".to_string()));
    let model_id: String = config.get_or("embedding.model_id", "bge-m3".to_string());
    let fake_dim: usize = config.get_or("embedding.dim", 1024);
    get_default_embedder(&model_dir, &model_id, fake_dim)
}

fn ingest(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let docs_dir = args.first().map(PathBuf::from).unwrap_or_else(|| {
        expand_path(config.get_or::<String>("data.docs_dir", "data".to_string()))
    });
    let index_dir = expand_path(config.get_or::<String>("data.index_dir", "vector_index".to_string()));

    println!("📚 Ingesting from {}", docs_dir.display());
    let docs = load_documents(&docs_dir)?;
    if docs.is_empty() {
        println!(
            "⚠️ No .txt or .pdf files found in {}. Add files and rerun.",
            docs_dir.display()
        );
        return Ok(());
    }

    println!("✂️ Splitting {} documents into chunks...", docs.len());
    let max_chars: usize = config.get_or("chunking.max_chars", DEFAULT_MAX_CHARS);
    let overlap: usize = config.get_or("chunking.overlap", DEFAULT_OVERLAP);
    let splitter = TextSplitter::new(max_chars, overlap)?;
    let chunks = splitter.split_documents(&docs);
    if chunks.is_empty() {
        println!("⚠️ Documents contained no usable text; nothing to index.");
        return Ok(());
    }
    println!("✅ Created {} text chunks.", chunks.len());

    let embedder = configured_embedder(config)?;
    let index = FlatIndex::build(embedder.as_ref(), &chunks)?;
    index.save(&index_dir)?;
    println!(
        "✅ Vector index saved at '{}' with {} chunks.",
        index_dir.display(),
        index.len()
    );
    Ok(())
}

async fn chat(config: &Config) -> anyhow::Result<()> {
    // Fail on a missing credential before any work happens, not at the
    // first completion call.
    let api_key = env::var("GOOGLE_API_KEY").map_err(|_| {
        anyhow::anyhow!("GOOGLE_API_KEY is not set; export it or add it to a .env file")
    })?;

    let index_dir = expand_path(config.get_or::<String>("data.index_dir", "vector_index".to_string()));
    println!("🔍 Loading vector index...");
    let embedder = configured_embedder(config)?;
    let engine = VectorSearchEngine::open(&index_dir, embedder)?;
    println!("📊 Index ready ({} chunks).", engine.chunk_count());

    let model: String = config.get_or("llm.model", DEFAULT_MODEL.to_string());
    let timeout_secs: u64 = config.get_or("llm.timeout_secs", 30);
    let max_attempts: u32 = config.get_or("llm.max_attempts", 3);
    let client = GeminiClient::new(api_key, model, Duration::from_secs(timeout_secs), max_attempts)?;

    let top_k: usize = config.get_or("retrieval.top_k", 5);
    let pipeline = AnswerPipeline::new(engine, client, top_k);

    println!("\n🎓 University RAG chatbot is ready! Type your question below ('exit' to leave):\n");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_chat_loop(&pipeline, stdin.lock(), &mut stdout).await
}
