// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure importance scoring for archived chunks.
//!
//! Multi-factor score: message length, message count, and character
//! variety. Deterministic, no I/O; the store uses it when archival does
//! not supply an explicit importance.

use std::collections::HashSet;

use engram_core::ConversationEntry;

/// Score returned for empty input: a fixed low-confidence default that
/// signals "unscored/trivial" rather than the 0.5 baseline.
const EMPTY_SCORE: f64 = 0.3;

/// Baseline score for any non-empty chunk.
const BASELINE: f64 = 0.5;

/// Rate an entry set 0.0-1.0.
///
/// Baseline 0.5 plus three additive factors, each clamped independently
/// before summation, final result clamped to [0, 1]:
/// - length: `min(mean_content_length / 1000, 0.2)`
/// - count: `min(message_count * 0.02, 0.15)`
/// - variety: `min(distinct_lowercased_chars / 50, 0.15)`
pub fn score_importance(entries: &[ConversationEntry]) -> f64 {
    if entries.is_empty() {
        return EMPTY_SCORE;
    }

    let mut score = BASELINE;

    let total_length: usize = entries.iter().map(|e| e.content.chars().count()).sum();
    let mean_length = total_length as f64 / entries.len() as f64;
    score += (mean_length / 1000.0).min(0.2);

    score += (entries.len() as f64 * 0.02).min(0.15);

    if total_length > 0 {
        let combined: String = entries
            .iter()
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let unique_chars: HashSet<char> = combined.to_lowercase().chars().collect();
        score += (unique_chars.len() as f64 / 50.0).min(0.15);
    }

    score.clamp(0.0, 1.0)
}
