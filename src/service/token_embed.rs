//! Token-level (ColBERT-style) embedding with a windowed fallback tier.
//!
//! Primary tier: the token-embedding model produces one hidden-state vector
//! per token; padding positions and structural markers are filtered out,
//! keeping tokens and vectors index-aligned.
//!
//! Fallback tier (token model unavailable, decided once per process): no
//! sub-word tokenization exists, so each text is split into fixed-width
//! character windows and each window is embedded through the embedding
//! service's document-mode path as a pseudo-token.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::registry::ModelRegistry;
use crate::service::embedding;

/// Pseudo-token width for the fallback tier, in characters.
pub const FALLBACK_WINDOW_CHARS: usize = 50;

/// Token-level embeddings for one input text. `tokens` and `embeddings`
/// are index-aligned and the same length; `dimension` is the width actually
/// produced, which differs between tiers.
#[derive(Debug, Clone, Serialize)]
pub struct TokenEmbeddingResult {
    pub tokens: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub dimension: usize,
}

/// Token-embed each text independently, with truncation to `max_length`
/// in the primary tier. The tier is selected by the registry's one-time
/// load decision, never re-probed per call.
pub async fn token_embed(
    registry: &ModelRegistry,
    texts: &[String],
    max_length: usize,
) -> Result<Vec<TokenEmbeddingResult>> {
    match registry.token_encoder().await {
        Some(encoder) => {
            let texts = texts.to_vec();
            let special = registry.models().special_tokens.clone();
            tokio::task::spawn_blocking(move || {
                texts
                    .iter()
                    .map(|text| {
                        let raw = encoder.encode_tokens(text, max_length)?;
                        Ok(filter_structural_tokens(
                            raw.tokens,
                            raw.attention_mask,
                            raw.vectors,
                            raw.hidden_size,
                            &special,
                        ))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .await
            .context("Token embedding task panicked")?
        }
        None => fallback_token_embed(registry, texts).await,
    }
}

/// Drop positions masked as padding or whose token string is a structural
/// marker. Output token and embedding lists stay the same length.
fn filter_structural_tokens(
    tokens: Vec<String>,
    attention_mask: Vec<u32>,
    vectors: Vec<Vec<f32>>,
    hidden_size: usize,
    special: &[String],
) -> TokenEmbeddingResult {
    let mut kept_tokens = Vec::with_capacity(tokens.len());
    let mut kept_vectors = Vec::with_capacity(vectors.len());

    for ((token, mask), vector) in tokens.into_iter().zip(attention_mask).zip(vectors) {
        if mask == 1 && !special.iter().any(|s| s == &token) {
            kept_tokens.push(token);
            kept_vectors.push(vector);
        }
    }

    TokenEmbeddingResult {
        tokens: kept_tokens,
        embeddings: kept_vectors,
        dimension: hidden_size,
    }
}

/// Windowed pseudo-token embedding, batched per text through the
/// document-mode embedding path.
async fn fallback_token_embed(
    registry: &ModelRegistry,
    texts: &[String],
) -> Result<Vec<TokenEmbeddingResult>> {
    let mut results = Vec::with_capacity(texts.len());

    for text in texts {
        let windows = char_windows(text, FALLBACK_WINDOW_CHARS);
        let embeddings = embedding::embed(registry, &windows, false).await?;
        let dimension = embeddings.first().map(|v| v.len()).unwrap_or(0);

        results.push(TokenEmbeddingResult {
            tokens: windows,
            embeddings,
            dimension,
        });
    }

    Ok(results)
}

/// Split into fixed-width character windows. An empty text is a single
/// empty window, so the output never has fewer than one pseudo-token.
/// Splits on char boundaries, never inside a multibyte sequence.
fn char_windows(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    text.chars()
        .collect::<Vec<char>>()
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
