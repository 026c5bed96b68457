//! Dense embedding with retrieval-role instruction prefixes.

use anyhow::{Context, Result};

use crate::registry::ModelRegistry;

/// Instruction prefixes are part of the retrieval protocol: they bias a
/// general-purpose embedding model toward query-vs-code framing and must
/// match what the searchgrep client indexes with, verbatim.
pub const CODE_INSTRUCTION: &str = "Represent this code snippet for retrieval: ";
pub const QUERY_INSTRUCTION: &str = "Represent this query for searching relevant code: ";

/// Embed a batch of texts, one vector per text in input order. Query mode
/// and document mode use different instruction prefixes. Long-input
/// truncation is the underlying model's responsibility.
pub async fn embed(
    registry: &ModelRegistry,
    texts: &[String],
    is_query: bool,
) -> Result<Vec<Vec<f32>>> {
    let embedder = registry.embedder().await;

    let instruction = if is_query {
        QUERY_INSTRUCTION
    } else {
        CODE_INSTRUCTION
    };
    let prefixed: Vec<String> = texts
        .iter()
        .map(|text| format!("{instruction}{text}"))
        .collect();

    tokio::task::spawn_blocking(move || embedder.encode(&prefixed))
        .await
        .context("Embedding task panicked")?
}
