//! Embedding functions.
//!
//! [`LocalEmbedder`] runs an XLM-RoBERTa-family sentence-embedding model
//! from local files (tokenizer.json, config.json, weights) with masked
//! mean-pooling and L2 normalization. [`FakeEmbedder`] is a deterministic
//! hash-bucket stand-in selected by `APP_USE_FAKE_EMBEDDINGS=1` so tests
//! and development never need model weights.

use anyhow::{anyhow, Result};
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;

pub use campusrag_core::traits::Embedder;

mod device;
mod tokenize;

pub const DEFAULT_MAX_LEN: usize = 256;

pub struct LocalEmbedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    id: String,
    dim: usize,
    max_len: usize,
}

#[derive(serde::Deserialize)]
struct ModelDims {
    hidden_size: usize,
}

impl LocalEmbedder {
    /// Load a model from `model_dir`. `model_id` is the configured model
    /// name; the embedder's identity is `"{model_id}:d{hidden_size}"` and
    /// is what index metadata records.
    pub fn load(model_dir: &Path, model_id: &str) -> Result<Self> {
        let device = device::select_device();

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config_json = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Failed to read {}: {}", config_path.display(), e))?;
        let config: XLMRobertaConfig = serde_json::from_str(&config_json)?;
        let dims: ModelDims = serde_json::from_str(&config_json)?;

        let vb = load_weights(model_dir, &device)?;
        let model = XLMRobertaModel::new(&config, vb)?;
        tracing::info!(model_id, dim = dims.hidden_size, "embedding model loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            id: format!("{}:d{}", model_id, dims.hidden_size),
            dim: dims.hidden_size,
            max_len: DEFAULT_MAX_LEN,
        })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) =
            tokenize::tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = Tensor::zeros((1, self.max_len), DType::I64, &self.device)?;
        let hidden =
            self.model
                .forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;

        // Mean over valid token positions, then L2-normalize.
        let mask = attention_mask.to_dtype(hidden.dtype())?;
        let mask_3d = mask.unsqueeze(2)?;
        let mask_b = mask_3d.broadcast_as(hidden.shape())?;
        let summed = (&hidden * &mask_b)?.sum(1)?;
        let counts = mask.sum(1)?.unsqueeze(1)?;
        let mean = summed.broadcast_div(&counts)?;

        let eps = Tensor::new(&[1e-12f32], &self.device)?
            .to_dtype(mean.dtype())?
            .unsqueeze(0)?;
        let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_add(&eps)?;
        let normalized = mean.broadcast_div(&norm)?;

        let vector: Vec<f32> = normalized.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if vector.len() != self.dim {
            return Err(anyhow!(
                "model produced a {}-dim vector, expected {}",
                vector.len(),
                self.dim
            ));
        }
        Ok(vector)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors_path = model_dir.join("model.safetensors");
    let tensors = if safetensors_path.exists() {
        candle_core::safetensors::load(&safetensors_path, device)?
    } else {
        let weights_path = model_dir.join("pytorch_model.bin");
        if !weights_path.exists() {
            return Err(anyhow!(
                "no model.safetensors or pytorch_model.bin under {}",
                model_dir.display()
            ));
        }
        candle_core::pickle::read_all(&weights_path)?.into_iter().collect()
    };
    Ok(VarBuilder::from_tensors(tensors, DType::F32, device))
}

impl Embedder for LocalEmbedder {
    fn id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}

/// Deterministic stand-in embedder: every whitespace token is hashed into
/// a bucket, the resulting vector is L2-normalized. Identical text always
/// yields an identical vector.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, id: format!("fake:xxhash:d{dim}") }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        for (position, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let bucket = (h as usize) % self.dim;
            let weight = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[bucket] += weight + (position as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        DEFAULT_MAX_LEN
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Construct the configured embedder. `APP_USE_FAKE_EMBEDDINGS=1` selects
/// the deterministic fake embedder with dimension `fake_dim`.
pub fn get_default_embedder(
    model_dir: &Path,
    model_id: &str,
    fake_dim: usize,
) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        println!("🧪 Using deterministic fake embeddings");
        return Ok(Box::new(FakeEmbedder::new(fake_dim)));
    }
    Ok(Box::new(LocalEmbedder::load(model_dir, model_id)?))
}
