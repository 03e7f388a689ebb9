// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Engram workspace.

use serde::{Deserialize, Serialize};

/// The speaker of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The system prompt. Only ever present at index 0 of the live window.
    System,
    /// A message typed by the user.
    User,
    /// A reply generated by the completion provider.
    Assistant,
}

impl Role {
    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse from a stored string, defaulting unknown values to `User`.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "system" => Role::System,
            "assistant" => Role::Assistant,
            _ => Role::User,
        }
    }
}

/// One entry in the live conversation window.
///
/// Entries are created by user input and completion replies, and removed
/// only by archival or an explicit clear. The entry at index 0 always has
/// role `System` and is replaced in place, never archived or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub content: String,
}

impl ConversationEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A request to the completion provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier passed through to the backend.
    pub model: String,
    /// Ordered role-tagged messages, system prompt first.
    pub messages: Vec<ConversationEntry>,
    /// Sampling temperature.
    pub temperature: f32,
}

/// The generated reply from the completion provider.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
}

/// Result of summarizing a chunk of conversation entries.
///
/// Transient: consumed by the archival path, never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    /// Compressed summary of the chunk. Never empty on a successful path.
    pub summary: String,
    /// Primary topic, may be empty.
    pub topic: String,
    /// Ordered key points extracted from the chunk.
    pub key_points: Vec<String>,
}

/// Aggregate statistics over the semantic store.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStats {
    /// Number of stored records.
    pub count: usize,
    /// Mean importance across records, 0.0 when empty.
    pub avg_importance: f64,
    /// Epoch-seconds timestamp of the oldest record, if any.
    pub oldest: Option<f64>,
    /// Epoch-seconds timestamp of the newest record, if any.
    pub newest: Option<f64>,
}
