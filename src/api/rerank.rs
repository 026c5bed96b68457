use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::ApiError;
use crate::models::{RerankRequest, RerankResponse};
use crate::service::rerank;
use crate::state::AppState;

/// POST /rerank - score documents against a query with the cross-encoder.
pub async fn rerank(
    State(state): State<AppState>,
    payload: Result<Json<RerankRequest>, JsonRejection>,
) -> Result<Json<RerankResponse>, ApiError> {
    let Json(req) = payload?;

    if req.query.is_empty() {
        return Err(ApiError::bad_request("No query provided"));
    }
    if req.documents.is_empty() {
        return Err(ApiError::bad_request("No documents provided"));
    }

    let results = rerank::rerank(&state.registry, &req.query, &req.documents, req.top_k)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(RerankResponse {
        results,
        model: state.config.models.reranker_model.clone(),
    }))
}
