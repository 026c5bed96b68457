//! HTTP handlers and the single error-conversion boundary.
//!
//! Every failure a caller can see is converted here into a JSON body of the
//! shape `{"error": msg}`: validation failures as 400s, unknown paths as
//! 404s, and unexpected service errors as 500s carrying the error message.
//! Nothing below the router produces HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::models::ErrorResponse;
use crate::state::AppState;

pub mod colbert;
pub mod embeddings;
pub mod health;
pub mod rerank;

/// Error response carrying a status code and a human-readable message.
#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, msg.into())
    }

    pub fn internal(err: anyhow::Error) -> Self {
        tracing::warn!("Request failed: {err:#}");
        Self(StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorResponse { error: self.1 })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(_: JsonRejection) -> Self {
        ApiError::bad_request("Invalid JSON")
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/embeddings", post(embeddings::embeddings))
        .route("/rerank", post(rerank::rerank))
        .route("/colbert_embeddings", post(colbert::colbert_embeddings))
        .route("/health", get(health::health).post(health::health))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError(StatusCode::NOT_FOUND, "Not found".to_string())
}
