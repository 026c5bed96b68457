use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::ApiError;
use crate::models::{EmbeddingsRequest, EmbeddingsResponse};
use crate::service::embedding;
use crate::state::AppState;

/// POST /embeddings - embed a batch of texts, query-mode or document-mode.
pub async fn embeddings(
    State(state): State<AppState>,
    payload: Result<Json<EmbeddingsRequest>, JsonRejection>,
) -> Result<Json<EmbeddingsResponse>, ApiError> {
    let Json(req) = payload?;

    if req.texts.is_empty() {
        return Err(ApiError::bad_request("No texts provided"));
    }

    let embeddings = embedding::embed(&state.registry, &req.texts, req.is_query)
        .await
        .map_err(ApiError::internal)?;

    let dimension = embeddings.first().map(|v| v.len()).unwrap_or(0);

    Ok(Json(EmbeddingsResponse {
        embeddings,
        model: state.config.models.embedding_model.clone(),
        dimension,
    }))
}
