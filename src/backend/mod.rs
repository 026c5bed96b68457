//! Model backends behind trait seams.
//!
//! The services only see these traits; the concrete implementations run
//! BERT-family models locally with candle. Every method here is blocking
//! and is expected to be called from `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle_core::Device;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};

pub mod bert;
pub mod cross_encoder;

/// Dense embedding: one fixed-length vector per input text, same order.
pub trait TextEmbedder: Send + Sync {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Cross-encoder scoring: one relevance score per (query, document) pair,
/// in document order.
pub trait PairScorer: Send + Sync {
    fn score(&self, query: &str, documents: &[String]) -> Result<Vec<f32>>;
}

/// Unfiltered token-level output for a single text: token strings, the
/// attention mask, and one hidden-state vector per position, all
/// index-aligned. Filtering of padding and structural markers happens in
/// the token-embedding service.
pub struct RawTokenEmbedding {
    pub tokens: Vec<String>,
    pub attention_mask: Vec<u32>,
    pub vectors: Vec<Vec<f32>>,
    pub hidden_size: usize,
}

/// Token-level embedding: per-position hidden states with truncation.
pub trait TokenEncoder: Send + Sync {
    fn encode_tokens(&self, text: &str, max_length: usize) -> Result<RawTokenEmbedding>;
}

/// Resolved model files: either a local directory or files fetched from
/// the Hugging Face Hub. Safetensors preferred, PyTorch fallback.
pub(crate) struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
    pub use_pth: bool,
}

pub(crate) fn resolve_model_files(model_id: &str) -> Result<ModelFiles> {
    if Path::new(model_id).exists() {
        let dir = Path::new(model_id);
        let (weights, use_pth) = if dir.join("model.safetensors").exists() {
            (dir.join("model.safetensors"), false)
        } else if dir.join("pytorch_model.bin").exists() {
            (dir.join("pytorch_model.bin"), true)
        } else {
            anyhow::bail!("No model weights found in {model_id}");
        };
        return Ok(ModelFiles {
            config: dir.join("config.json"),
            tokenizer: dir.join("tokenizer.json"),
            weights,
            use_pth,
        });
    }

    let repo = Repo::with_revision(model_id.to_string(), RepoType::Model, "main".to_string());
    let api = Api::new()?.repo(repo);
    let config = api
        .get("config.json")
        .with_context(|| format!("Failed to fetch config.json for {model_id}"))?;
    let tokenizer = api
        .get("tokenizer.json")
        .with_context(|| format!("Failed to fetch tokenizer.json for {model_id}"))?;
    let (weights, use_pth) = match api.get("model.safetensors") {
        Ok(weights) => (weights, false),
        Err(_) => (
            api.get("pytorch_model.bin")
                .with_context(|| format!("No model weights found for {model_id}"))?,
            true,
        ),
    };

    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
        use_pth,
    })
}

pub(crate) fn pick_device(use_cpu: bool) -> Result<Device> {
    if use_cpu {
        Ok(Device::Cpu)
    } else {
        Ok(Device::cuda_if_available(0)?)
    }
}
