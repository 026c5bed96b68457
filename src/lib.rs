//! # searchgrep-embed
//!
//! A local HTTP service exposing three ML inference capabilities to the
//! searchgrep code-search client: dense text embedding, cross-encoder
//! reranking, and token-level (ColBERT-style) embedding.
//!
//! ## Architecture
//!
//! ```text
//!              ┌──────────────────────────────┐
//!              │         HTTP Router          │
//!              │  /embeddings  /rerank        │
//!              │  /colbert_embeddings /health │
//!              └──────┬───────┬───────┬───────┘
//!                     │       │       │
//!            ┌────────┘       │       └────────┐
//!            ▼                ▼                ▼
//!   ┌────────────────┐ ┌────────────┐ ┌──────────────────┐
//!   │ Embedding Svc  │ │ Rerank Svc │ │ Token Embed Svc  │
//!   │ query/doc      │ │ pair score │ │ primary: token   │
//!   │ instructions   │ │ sort+top_k │ │ model, filtered  │
//!   └───────┬────────┘ └─────┬──────┘ │ fallback: char   │
//!           │                │        │ windows → Embed  │
//!           │                │        └───┬─────────┬────┘
//!           ▼                ▼            ▼         │
//!   ┌──────────────────────────────────────────┐   │
//!   │             Model Registry               │◄──┘
//!   │  lazy once-only load per model kind;     │
//!   │  token-model load failure permanently    │
//!   │  selects the fallback tier               │
//!   └──────────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for bind address, preload, and model ids
//! - [`models`] - Request/response types for the JSON protocol
//! - [`registry`] - Lazily-initialized, once-only model instances with readiness reporting
//! - [`backend`] - Candle/tokenizers model backends behind trait seams
//! - [`service`] - Embedding, reranking, and token-embedding orchestration
//! - [`api`] - Axum HTTP handlers and the single error-conversion boundary
//! - [`state`] - Shared application state holding config and the registry

pub mod api;
pub mod backend;
pub mod config;
pub mod models;
pub mod registry;
pub mod service;
pub mod state;
