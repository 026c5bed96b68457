use tracing_subscriber::EnvFilter;

use searchgrep_embed::api;
use searchgrep_embed::config::Config;
use searchgrep_embed::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Embedding model: {}", config.models.embedding_model);
    tracing::info!("Reranker model: {}", config.models.reranker_model);
    tracing::info!("ColBERT model: {}", config.models.colbert_model);

    let state = AppState::new(config.clone());

    // Eagerly load the two load-bearing models so the first real request
    // is not slowed by load latency. The token model stays lazy: its
    // failure only selects the fallback tier.
    if config.preload {
        state.registry.embedder().await;
        state.registry.scorer().await;
    }

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Embedding server listening on http://{}", config.bind_addr());
    tracing::info!("  POST /embeddings         - Get embeddings for texts");
    tracing::info!("  POST /rerank             - Rerank documents for a query");
    tracing::info!("  POST /colbert_embeddings - Get token-level embeddings");
    tracing::info!("  GET  /health             - Health check");

    axum::serve(listener, app).await?;
    Ok(())
}
