// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable semantic memory for engram.
//!
//! Archived conversation chunks live in a SQLite database as summary text
//! plus an embedding vector. Recall is cosine-distance ranking over the
//! candidate set, gated by an importance threshold. The [`scorer`] module
//! assigns importance at archive time; [`embedder`] provides the default
//! deterministic embedding backend.

pub mod embedder;
pub mod scorer;
pub mod store;
pub mod types;

pub use embedder::{HashEmbedder, EMBEDDING_DIM};
pub use scorer::score_importance;
pub use store::SemanticStore;
pub use types::{cosine_distance, cosine_similarity, MemoryRecord, RecalledMemory, Relevance};
