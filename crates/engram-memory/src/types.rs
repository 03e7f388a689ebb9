// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types for the semantic store.

use serde::{Deserialize, Serialize};

/// A single archived memory record.
///
/// Created only by archival, immutable once stored, and owned by the
/// semantic store. Destroyed only by an explicit clear-all or age-based
/// cleanup; the recall path is read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique identifier for this record.
    pub id: String,
    /// Compressed summary of the archived chunk.
    pub summary: String,
    /// Primary topic of the chunk. May be empty.
    pub topic: String,
    /// Creation time as epoch seconds.
    pub timestamp: f64,
    /// Number of conversation entries compressed into this record.
    pub message_count: i64,
    /// Importance score in [0, 1].
    pub importance: f64,
    /// Embedding vector for semantic search. Opaque outside the store.
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// A memory record with a per-query distance, produced by recall.
///
/// Transient: never persisted.
#[derive(Debug, Clone)]
pub struct RecalledMemory {
    /// The stored record.
    pub record: MemoryRecord,
    /// Distance to the query; lower means more similar. Non-negative.
    pub distance: f32,
}

/// Relevance banding derived from distance, for presentation only.
///
/// Never used to filter recall results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    /// Band a distance: `< 0.3` high, `< 0.6` medium, else low.
    pub fn from_distance(distance: f32) -> Self {
        if distance < 0.3 {
            Relevance::High
        } else if distance < 0.6 {
            Relevance::Medium
        } else {
            Relevance::Low
        }
    }

    /// Display label used in composed memory blocks.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relevance::High => "high",
            Relevance::Medium => "medium",
            Relevance::Low => "low",
        }
    }
}

/// Convert an f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert a SQLite BLOB back to an f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

/// Compute cosine similarity between two vectors.
///
/// For L2-normalized vectors (as produced by the reference embedder),
/// this is equivalent to the dot product.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have same length");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Distance metric used by the store: `1 - cosine_similarity`, floored at 0.
///
/// Zero means identical direction; larger means less similar.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).max(0.0)
}
