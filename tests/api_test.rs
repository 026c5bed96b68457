//! Integration tests for the HTTP protocol.
//!
//! These exercise routing, validation, and serialization against stub
//! model backends, so no model files or network access are required.

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use searchgrep_embed::api;
use searchgrep_embed::backend::{PairScorer, RawTokenEmbedding, TextEmbedder, TokenEncoder};
use searchgrep_embed::config::Config;
use searchgrep_embed::registry::ModelRegistry;
use searchgrep_embed::state::AppState;

/// 3-dimensional deterministic embeddings keyed on text length.
struct StubEmbedder;
impl TextEmbedder for StubEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| vec![t.len() as f32, 1.0, -1.0])
            .collect())
    }
}

/// Scores descend with document position so ranking is predictable.
struct PositionScorer;
impl PairScorer for PositionScorer {
    fn score(&self, _query: &str, documents: &[String]) -> Result<Vec<f32>> {
        Ok((0..documents.len())
            .map(|i| 1.0 - 0.1 * i as f32)
            .collect())
    }
}

struct StubTokenEncoder;
impl TokenEncoder for StubTokenEncoder {
    fn encode_tokens(&self, _text: &str, _max_length: usize) -> Result<RawTokenEmbedding> {
        Ok(RawTokenEmbedding {
            tokens: ["[CLS]", "sort", "list", "[SEP]"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            attention_mask: vec![1, 1, 1, 1],
            vectors: vec![vec![0.0; 8]; 4],
            hidden_size: 8,
        })
    }
}

/// Fails every call, for exercising the server-error boundary.
struct BrokenEmbedder;
impl TextEmbedder for BrokenEmbedder {
    fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        anyhow::bail!("embedding backend exploded")
    }
}

fn app_with_token_model(token: Option<Arc<dyn TokenEncoder>>) -> Router {
    let config = Config::default();
    let registry = Arc::new(ModelRegistry::with_models(
        config.models.clone(),
        Arc::new(StubEmbedder),
        Arc::new(PositionScorer),
        token,
    ));
    api::router(AppState::with_registry(config, registry))
}

fn app() -> Router {
    app_with_token_model(Some(Arc::new(StubTokenEncoder)))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_embeddings_returns_one_vector_per_text() {
    let response = app()
        .oneshot(post_json(
            "/embeddings",
            json!({"texts": ["def foo():"], "is_query": false}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["embeddings"].as_array().unwrap().len(), 1);
    assert_eq!(body["dimension"], 3);
    assert_eq!(
        body["model"],
        Config::default().models.embedding_model.as_str()
    );
}

#[tokio::test]
async fn test_embeddings_empty_texts_is_400() {
    let response = app()
        .oneshot(post_json("/embeddings", json!({"texts": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No texts provided");
}

#[tokio::test]
async fn test_embeddings_missing_texts_is_400() {
    let response = app()
        .oneshot(post_json("/embeddings", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_400_invalid_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/embeddings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid JSON");
}

#[tokio::test]
async fn test_rerank_top_k_scores_descending() {
    let response = app()
        .oneshot(post_json(
            "/rerank",
            json!({"query": "sort list", "documents": ["a", "b", "c"], "top_k": 2}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    let first = results[0]["score"].as_f64().unwrap();
    let second = results[1]["score"].as_f64().unwrap();
    assert!(first >= second);
    assert_eq!(results[0]["index"], 0);
    assert_eq!(results[0]["document"], "a");
}

#[tokio::test]
async fn test_rerank_missing_query_is_400() {
    let response = app()
        .oneshot(post_json("/rerank", json!({"documents": ["a"]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No query provided");
}

#[tokio::test]
async fn test_rerank_missing_documents_is_400() {
    let response = app()
        .oneshot(post_json("/rerank", json!({"query": "q"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No documents provided");
}

#[tokio::test]
async fn test_colbert_primary_tier_filters_markers() {
    let response = app()
        .oneshot(post_json(
            "/colbert_embeddings",
            json!({"texts": ["sort list"]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let result = &body["results"][0];
    let tokens: Vec<&str> = result["tokens"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    assert_eq!(tokens, vec!["sort", "list"]);
    assert_eq!(tokens.len(), result["embeddings"].as_array().unwrap().len());
    assert_eq!(result["dimension"], 8);
}

#[tokio::test]
async fn test_colbert_fallback_tier_windows_text() {
    let text = "x".repeat(120);
    let response = app_with_token_model(None)
        .oneshot(post_json("/colbert_embeddings", json!({"texts": [text]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let result = &body["results"][0];
    // ceil(120 / 50) pseudo-tokens, embedded at the stub's width
    assert_eq!(result["tokens"].as_array().unwrap().len(), 3);
    assert_eq!(result["dimension"], 3);
}

#[tokio::test]
async fn test_colbert_empty_texts_is_400() {
    let response = app()
        .oneshot(post_json("/colbert_embeddings", json!({"texts": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_ok_and_readiness() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["embedding_ready"], true);
    assert_eq!(body["reranker_ready"], true);
    assert_eq!(body["colbert_ready"], true);
}

#[tokio::test]
async fn test_health_reports_colbert_unready_after_fallback_decision() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app_with_token_model(None).oneshot(request).await.unwrap();

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["colbert_ready"], false);
}

#[tokio::test]
async fn test_unknown_path_is_404_not_found() {
    let request = Request::builder()
        .method("GET")
        .uri("/unknown")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_query_and_document_embeddings_differ() {
    // The stub keys on input length, and the two instruction prefixes
    // differ in length, so distinct vectors prove the prefix was applied.
    let doc = app()
        .oneshot(post_json(
            "/embeddings",
            json!({"texts": ["same"], "is_query": false}),
        ))
        .await
        .unwrap();
    let query = app()
        .oneshot(post_json(
            "/embeddings",
            json!({"texts": ["same"], "is_query": true}),
        ))
        .await
        .unwrap();

    let doc_body = body_json(doc).await;
    let query_body = body_json(query).await;
    assert_ne!(doc_body["embeddings"], query_body["embeddings"]);
}

#[tokio::test]
async fn test_inference_failure_is_500_and_service_keeps_serving() {
    let config = Config::default();
    let registry = Arc::new(ModelRegistry::with_models(
        config.models.clone(),
        Arc::new(BrokenEmbedder),
        Arc::new(PositionScorer),
        Some(Arc::new(StubTokenEncoder)),
    ));
    let app = api::router(AppState::with_registry(config, registry));

    let response = app
        .clone()
        .oneshot(post_json("/embeddings", json!({"texts": ["def foo():"]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("embedding backend exploded"));

    // A failed inference must not wedge the server: the next request on
    // the same app still gets a normal response.
    let response = app
        .oneshot(post_json(
            "/rerank",
            json!({"query": "q", "documents": ["a", "b"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
