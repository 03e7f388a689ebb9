// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits for the two external collaborators the orchestrator
//! consumes: the completion provider and the embedding backend.
//!
//! Both use `#[async_trait]` for dynamic dispatch so backends can be
//! swapped (HTTP endpoint, scripted mock, local reference embedder).

use async_trait::async_trait;

use crate::error::EngramError;
use crate::types::{CompletionRequest, CompletionResponse};

/// Turns a list of role-tagged messages into a generated reply.
///
/// Stateless per call. The orchestrator and the summarizer are the only
/// callers. Implementations must bound each call with their own timeout.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable name of this provider instance.
    fn name(&self) -> &str;

    /// Sends a completion request and returns the full generated reply.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, EngramError>;
}

/// Produces vector embeddings for short text records.
///
/// Powers semantic recall in the store. Vectors are opaque to everything
/// outside the store; only the backend's distance metric interprets them.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Dimensionality of the vectors this embedder produces.
    fn dimensions(&self) -> usize;

    /// Embeds each input text into one vector, preserving order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngramError>;
}
