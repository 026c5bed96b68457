use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::ApiError;
use crate::models::{ColbertRequest, ColbertResponse};
use crate::service::token_embed;
use crate::state::AppState;

/// POST /colbert_embeddings - token-level embeddings for each text.
pub async fn colbert_embeddings(
    State(state): State<AppState>,
    payload: Result<Json<ColbertRequest>, JsonRejection>,
) -> Result<Json<ColbertResponse>, ApiError> {
    let Json(req) = payload?;

    if req.texts.is_empty() {
        return Err(ApiError::bad_request("No texts provided"));
    }

    let results = token_embed::token_embed(&state.registry, &req.texts, req.max_length)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(ColbertResponse {
        results,
        model: state.config.models.colbert_model.clone(),
    }))
}
