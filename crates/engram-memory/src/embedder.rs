// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic reference embedder based on feature hashing.
//!
//! Hashes lowercased word unigrams and character trigrams into a fixed
//! 256-dimension vector and L2-normalizes it. Identical text always maps
//! to an identical vector, which keeps recall ranking reproducible and
//! supports the store's round-trip guarantee. The store treats these
//! vectors as opaque; swapping in a model-backed [`Embedder`] requires no
//! store changes.

use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;
use engram_core::{Embedder, EngramError};

/// Dimensionality of the reference embedding space.
pub const EMBEDDING_DIM: usize = 256;

/// Feature-hashing embedder. Stateless and cheap; `DefaultHasher` uses
/// fixed keys, so output is stable across processes built with the same
/// toolchain. std does not pin the hash algorithm across Rust releases,
/// so stored embeddings may need a rebuild (`clear_all` and re-archive)
/// after a compiler upgrade; a model-backed [`Embedder`] avoids this.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            dimensions: EMBEDDING_DIM,
        }
    }

    /// Embed a single text into a normalized feature vector.
    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        let lowered = text.to_lowercase();

        for word in lowered.split_whitespace() {
            self.bump(&mut vector, "w", word);

            let chars: Vec<char> = word.chars().collect();
            for trigram in chars.windows(3) {
                let gram: String = trigram.iter().collect();
                self.bump(&mut vector, "t", &gram);
            }
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }

    /// Hash a (kind, token) feature into a signed bucket increment.
    fn bump(&self, vector: &mut [f32], kind: &str, token: &str) {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        token.hash(&mut hasher);
        let hash = hasher.finish();

        let index = (hash % self.dimensions as u64) as usize;
        // Use a high bit for the sign so bucket collisions partially cancel.
        let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        vector[index] += sign;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngramError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
