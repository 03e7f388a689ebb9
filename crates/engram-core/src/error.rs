// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Engram agent.

use thiserror::Error;

/// The primary error type used across Engram crates.
///
/// Maps the agent's failure taxonomy: configuration errors surface once at
/// construction and degrade the memory subsystem rather than aborting;
/// store and provider errors are recovered locally where a fallback exists
/// (local summary, window truncation) and are fatal to the turn only for
/// the main completion call. Malformed summarization output is handled by
/// the tolerant parser and never becomes an error value.
#[derive(Debug, Error)]
pub enum EngramError {
    /// Configuration errors (invalid TOML, missing persistence path, bad ranges).
    #[error("configuration error: {0}")]
    Config(String),

    /// Semantic store errors (database open, query failure, blob decode).
    #[error("memory store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Completion provider errors (API failure, bad status, unparsable body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
