use axum::extract::State;
use axum::Json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// GET/POST /health - readiness of each model without loading any of them.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = &state.config.models;
    let registry = &state.registry;

    Json(HealthResponse {
        status: "ok",
        embedding_model: models.embedding_model.clone(),
        embedding_ready: registry.embedder_ready(),
        reranker_model: models.reranker_model.clone(),
        reranker_ready: registry.scorer_ready(),
        colbert_model: models.colbert_model.clone(),
        colbert_ready: registry.token_encoder_ready(),
    })
}
