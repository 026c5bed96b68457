use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind host (loopback by default; this service has no auth)
    pub host: String,
    /// Bind port. The searchgrep client expects this fixed default.
    pub port: u16,
    /// Load the embedding and reranker models before accepting connections,
    /// so the first real request is not slowed by load latency.
    pub preload: bool,
    /// Model identifiers and inference settings
    pub models: ModelConfig,
}

/// Identifiers for the three models plus per-model inference settings.
/// Each identifier is either a local directory or a Hugging Face Hub id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Dense embedding model (sentence-transformer style, mean pooled)
    pub embedding_model: String,
    /// Cross-encoder reranker model (single-logit classification head)
    pub reranker_model: String,
    /// Token-level embedding model for ColBERT-style matching
    pub colbert_model: String,
    /// Force CPU inference even when CUDA is available
    pub use_cpu: bool,
    /// Structural markers stripped from token-embedding output. The set is
    /// tokenizer-family-specific, so it is configurable per token model.
    pub special_tokens: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            preload: false,
            models: ModelConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            reranker_model: "cross-encoder/ms-marco-MiniLM-L-6-v2".to_string(),
            colbert_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            use_cpu: false,
            special_tokens: default_special_tokens(),
        }
    }
}

/// Markers for classification, separator, padding, and the two alternate
/// begin/end-of-sequence conventions used by different tokenizer families.
fn default_special_tokens() -> Vec<String> {
    ["[CLS]", "[SEP]", "[PAD]", "<s>", "</s>"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("SEARCHGREP_EMBED_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("SEARCHGREP_EMBED_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        if let Ok(val) = std::env::var("SEARCHGREP_EMBED_PRELOAD") {
            config.preload = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Ok(val) = std::env::var("SEARCHGREP_EMBED_CPU") {
            config.models.use_cpu = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.models.embedding_model = model;
        }
        if let Ok(model) = std::env::var("RERANKER_MODEL") {
            config.models.reranker_model = model;
        }
        if let Ok(model) = std::env::var("COLBERT_MODEL") {
            config.models.colbert_model = model;
        }
        if let Ok(val) = std::env::var("COLBERT_SPECIAL_TOKENS") {
            let tokens: Vec<String> = val
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if !tokens.is_empty() {
                config.models.special_tokens = tokens;
            }
        }

        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
