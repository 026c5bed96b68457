//! Lazily-initialized, once-only model instances.
//!
//! Each model kind is loaded on first use behind a [`tokio::sync::OnceCell`],
//! so concurrent first callers cannot trigger duplicate initialization: the
//! exclusive section covers exactly the Unloaded→Ready/Failed transition and
//! the handles are read-only `Arc`s afterwards.
//!
//! Failure semantics differ per kind. The embedding and reranker models are
//! load-bearing: no correct response can ever be produced without them, so a
//! load failure is fatal for the process. The token-embedding model is not:
//! its failure is durably remembered as `None` and the token-embedding
//! service takes the windowed fallback path on every subsequent request,
//! without re-attempting the expensive load.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::backend::bert::BertEncoder;
use crate::backend::cross_encoder::CrossEncoder;
use crate::backend::{PairScorer, TextEmbedder, TokenEncoder};
use crate::config::ModelConfig;

pub struct ModelRegistry {
    models: ModelConfig,
    embedder: OnceCell<Arc<dyn TextEmbedder>>,
    scorer: OnceCell<Arc<dyn PairScorer>>,
    /// `Some(None)` once a load attempt has failed: the fallback decision
    /// is made once per process lifetime, never per request.
    token_encoder: OnceCell<Option<Arc<dyn TokenEncoder>>>,
}

impl ModelRegistry {
    pub fn new(models: ModelConfig) -> Self {
        Self {
            models,
            embedder: OnceCell::new(),
            scorer: OnceCell::new(),
            token_encoder: OnceCell::new(),
        }
    }

    /// Build a registry with pre-loaded model instances. `token_encoder:
    /// None` means the fallback decision has already been made. Used by
    /// tests and available to library consumers.
    pub fn with_models(
        models: ModelConfig,
        embedder: Arc<dyn TextEmbedder>,
        scorer: Arc<dyn PairScorer>,
        token_encoder: Option<Arc<dyn TokenEncoder>>,
    ) -> Self {
        Self {
            models,
            embedder: OnceCell::new_with(Some(embedder)),
            scorer: OnceCell::new_with(Some(scorer)),
            token_encoder: OnceCell::new_with(Some(token_encoder)),
        }
    }

    pub fn models(&self) -> &ModelConfig {
        &self.models
    }

    /// Get the embedding model, loading it on first use. Idempotent; a load
    /// failure is fatal for the process.
    pub async fn embedder(&self) -> Arc<dyn TextEmbedder> {
        self.embedder
            .get_or_init(|| async {
                let id = self.models.embedding_model.clone();
                let use_cpu = self.models.use_cpu;
                tracing::info!("Loading embedding model {id}...");
                let loaded =
                    tokio::task::spawn_blocking(move || BertEncoder::load(&id, use_cpu)).await;
                match loaded {
                    Ok(Ok(model)) => {
                        tracing::info!("Embedding model loaded");
                        Arc::new(model) as Arc<dyn TextEmbedder>
                    }
                    Ok(Err(e)) => fatal_load_error("embedding", &e),
                    Err(e) => fatal_load_error("embedding", &e.into()),
                }
            })
            .await
            .clone()
    }

    /// Get the cross-encoder reranker, loading it on first use. Idempotent;
    /// a load failure is fatal for the process.
    pub async fn scorer(&self) -> Arc<dyn PairScorer> {
        self.scorer
            .get_or_init(|| async {
                let id = self.models.reranker_model.clone();
                let use_cpu = self.models.use_cpu;
                tracing::info!("Loading cross-encoder reranker model {id}...");
                let loaded =
                    tokio::task::spawn_blocking(move || CrossEncoder::load(&id, use_cpu)).await;
                match loaded {
                    Ok(Ok(model)) => {
                        tracing::info!("Reranker model loaded");
                        Arc::new(model) as Arc<dyn PairScorer>
                    }
                    Ok(Err(e)) => fatal_load_error("reranker", &e),
                    Err(e) => fatal_load_error("reranker", &e.into()),
                }
            })
            .await
            .clone()
    }

    /// Get the token-embedding model, attempting the load exactly once per
    /// process lifetime. Returns `None` if that attempt failed; callers then
    /// use the windowed fallback tier.
    pub async fn token_encoder(&self) -> Option<Arc<dyn TokenEncoder>> {
        self.token_encoder
            .get_or_init(|| async {
                let id = self.models.colbert_model.clone();
                let use_cpu = self.models.use_cpu;
                tracing::info!("Loading token embedding model {id}...");
                let loaded =
                    tokio::task::spawn_blocking(move || BertEncoder::load(&id, use_cpu)).await;
                match loaded {
                    Ok(Ok(model)) => {
                        tracing::info!("Token embedding model loaded");
                        Some(Arc::new(model) as Arc<dyn TokenEncoder>)
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(
                            "Token embedding model unavailable, \
                             using windowed fallback: {e:#}"
                        );
                        None
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Token embedding model load panicked, \
                             using windowed fallback: {e}"
                        );
                        None
                    }
                }
            })
            .await
            .clone()
    }

    // Non-blocking readiness queries for /health.

    pub fn embedder_ready(&self) -> bool {
        self.embedder.initialized()
    }

    pub fn scorer_ready(&self) -> bool {
        self.scorer.initialized()
    }

    pub fn token_encoder_ready(&self) -> bool {
        matches!(self.token_encoder.get(), Some(Some(_)))
    }
}

fn fatal_load_error(kind: &str, err: &anyhow::Error) -> ! {
    // The process cannot serve any correct response without this model.
    tracing::error!("Failed to load {kind} model: {err:#}");
    std::process::exit(1);
}
