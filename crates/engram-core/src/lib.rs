// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Engram memory-augmented agent.
//!
//! This crate provides the error taxonomy, conversation and memory domain
//! types, and the adapter traits for the completion provider and embedding
//! backend. Everything else in the workspace builds on these definitions.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::EngramError;
pub use traits::{CompletionProvider, Embedder};
pub use types::{
    CompletionRequest, CompletionResponse, ConversationEntry, MemoryStats, Role, SummaryResult,
};
