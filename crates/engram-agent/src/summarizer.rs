// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chunk summarization for archival.
//!
//! Condenses a chunk of conversation entries into a short summary, topic
//! label, and key points by asking the completion provider. Summarization
//! is best-effort: any provider failure or unparseable reply degrades to a
//! deterministic extractive fallback, so archival itself never blocks on
//! the model.

use std::sync::Arc;

use engram_core::{
    CompletionProvider, CompletionRequest, ConversationEntry, Role, SummaryResult,
};
use tracing::{debug, warn};

/// Messages longer than this are truncated before entering the
/// summarization prompt.
const MAX_MESSAGE_CHARS: usize = 500;

/// Topic fallback when no user message is available to derive one from.
const DEFAULT_TOPIC: &str = "general conversation";

const SUMMARIZER_SYSTEM_PROMPT: &str = "You are a precise conversation archivist. \
You condense conversation excerpts into compact summaries that preserve facts, \
decisions, names, and preferences. Respond only in the requested format.";

/// Produces summaries of conversation chunks via the completion provider.
pub struct Summarizer {
    provider: Arc<dyn CompletionProvider>,
    model: String,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: String) -> Self {
        Self { provider, model }
    }

    /// Summarizes a chunk of conversation entries.
    ///
    /// Infallible: provider errors and malformed replies fall back to an
    /// extractive summary built from the chunk itself.
    pub async fn summarize(&self, chunk: &[ConversationEntry]) -> SummaryResult {
        let transcript = render_transcript(chunk);
        if transcript.is_empty() {
            return fallback_summary(chunk);
        }

        let instruction = format!(
            "Summarize the following conversation excerpt.\n\
             Reply in exactly this format:\n\
             SUMMARY: <one or two sentences>\n\
             TOPIC: <two to four words>\n\
             POINTS: <comma-separated key points>\n\n\
             Conversation:\n{transcript}"
        );

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ConversationEntry::system(SUMMARIZER_SYSTEM_PROMPT),
                ConversationEntry::user(instruction),
            ],
            // Low temperature keeps summaries factual and stable.
            temperature: 0.2,
        };

        match self.provider.complete(request).await {
            Ok(response) => {
                let result = parse_summary_response(&response.content, chunk);
                debug!(topic = %result.topic, "chunk summarized");
                result
            }
            Err(e) => {
                warn!(error = %e, "summarization failed, using extractive fallback");
                fallback_summary(chunk)
            }
        }
    }
}

/// Renders a chunk as a transcript, skipping system entries and
/// truncating long messages.
fn render_transcript(chunk: &[ConversationEntry]) -> String {
    chunk
        .iter()
        .filter(|entry| entry.role != Role::System)
        .map(|entry| {
            let content = truncate_chars(&entry.content, MAX_MESSAGE_CHARS);
            format!("{}: {}", entry.role.as_str().to_uppercase(), content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncates to at most `max` chars, replacing the tail with "...".
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Parses the labeled reply format. Tolerant of extra whitespace, label
/// case, and missing labels; an empty summary falls back to the whole
/// trimmed reply, and a fully unusable reply falls back extractively.
fn parse_summary_response(response: &str, chunk: &[ConversationEntry]) -> SummaryResult {
    let mut summary = String::new();
    let mut topic = String::new();
    let mut key_points = Vec::new();

    for line in response.lines() {
        let line = line.trim();
        if let Some(rest) = strip_label(line, "SUMMARY:") {
            summary = rest.to_string();
        } else if let Some(rest) = strip_label(line, "TOPIC:") {
            topic = rest.to_string();
        } else if let Some(rest) = strip_label(line, "POINTS:") {
            key_points = rest
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
        }
    }

    if summary.is_empty() {
        summary = response.trim().to_string();
    }
    if summary.is_empty() {
        return fallback_summary(chunk);
    }
    if topic.is_empty() {
        topic = derive_topic(chunk);
    }

    SummaryResult {
        summary,
        topic,
        key_points,
    }
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        Some(line[label.len()..].trim())
    } else {
        None
    }
}

/// Extractive summary used when the provider is unavailable or unhelpful.
fn fallback_summary(chunk: &[ConversationEntry]) -> SummaryResult {
    let user_count = chunk.iter().filter(|e| e.role == Role::User).count();
    let assistant_count = chunk.iter().filter(|e| e.role == Role::Assistant).count();
    SummaryResult {
        summary: format!(
            "Exchange of {user_count} user messages and {assistant_count} responses"
        ),
        topic: derive_topic(chunk),
        key_points: Vec::new(),
    }
}

/// Derives a topic from the first ten words of the first user message.
fn derive_topic(chunk: &[ConversationEntry]) -> String {
    let Some(first_user) = chunk.iter().find(|e| e.role == Role::User) else {
        return DEFAULT_TOPIC.to_string();
    };
    let words: Vec<&str> = first_user.content.split_whitespace().collect();
    if words.is_empty() {
        return DEFAULT_TOPIC.to_string();
    }
    let mut topic = words.iter().take(10).copied().collect::<Vec<_>>().join(" ");
    if words.len() > 10 {
        topic.push_str("...");
    }
    topic
}
