//! Embedding, reranking, and token-embedding orchestration.
//!
//! Each service lazily ensures its model is loaded via the registry, runs
//! inference under `spawn_blocking`, and applies the deterministic
//! post-processing the protocol requires. Input validation happens at the
//! router; errors from here surface as 500s there.

pub mod embedding;
pub mod rerank;
pub mod token_embed;
