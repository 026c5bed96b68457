//! Cross-encoder reranking: batch pair scoring, stable sort, top_k.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::registry::ModelRegistry;

/// Result of reranking a single document.
#[derive(Debug, Clone, Serialize)]
pub struct RerankResult {
    /// Index into the original documents array.
    pub index: usize,
    /// Relevance score (0.0 - 1.0 after sigmoid normalization).
    pub score: f32,
    /// The document text, echoed back for convenience.
    pub document: String,
}

/// Rerank documents against a query. Scores all pairs in one batched call,
/// sorts by score descending (ties preserve original input order), and
/// keeps the `top_k` best if given. `top_k` larger than the document count
/// is clamped, not an error.
pub async fn rerank(
    registry: &ModelRegistry,
    query: &str,
    documents: &[String],
    top_k: Option<usize>,
) -> Result<Vec<RerankResult>> {
    let scorer = registry.scorer().await;

    let query = query.to_string();
    let docs = documents.to_vec();
    let scores = tokio::task::spawn_blocking(move || scorer.score(&query, &docs))
        .await
        .context("Rerank task panicked")??;

    anyhow::ensure!(
        scores.len() == documents.len(),
        "Reranker returned {} scores for {} documents",
        scores.len(),
        documents.len()
    );

    let mut results: Vec<RerankResult> = scores
        .into_iter()
        .zip(documents.iter())
        .enumerate()
        .map(|(index, (score, document))| RerankResult {
            index,
            score,
            document: document.clone(),
        })
        .collect();

    // Stable sort keeps original order for equal scores
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if let Some(k) = top_k {
        results.truncate(k);
    }

    Ok(results)
}
