use serde::{Deserialize, Serialize};

use crate::service::rerank::RerankResult;
use crate::service::token_embed::TokenEmbeddingResult;

/// POST /embeddings request
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsRequest {
    #[serde(default)]
    pub texts: Vec<String>,
    #[serde(default)]
    pub is_query: bool,
}

/// POST /embeddings response
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsResponse {
    pub embeddings: Vec<Vec<f32>>,
    pub model: String,
    pub dimension: usize,
}

/// POST /rerank request
#[derive(Debug, Clone, Deserialize)]
pub struct RerankRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// POST /rerank response
#[derive(Debug, Clone, Serialize)]
pub struct RerankResponse {
    pub results: Vec<RerankResult>,
    pub model: String,
}

/// POST /colbert_embeddings request
#[derive(Debug, Clone, Deserialize)]
pub struct ColbertRequest {
    #[serde(default)]
    pub texts: Vec<String>,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_max_length() -> usize {
    128
}

/// POST /colbert_embeddings response
#[derive(Debug, Clone, Serialize)]
pub struct ColbertResponse {
    pub results: Vec<TokenEmbeddingResult>,
    pub model: String,
}

/// GET/POST /health response. Reports readiness without loading anything.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub embedding_model: String,
    pub embedding_ready: bool,
    pub reranker_model: String,
    pub reranker_ready: bool,
    pub colbert_model: String,
    pub colbert_ready: bool,
}

/// Error payload for every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
