// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn orchestration: archival, recall, composition, completion, commit.
//!
//! The [`Orchestrator`] owns the live conversation exclusively. Each call
//! to [`Orchestrator::process_prompt`] runs one full turn cycle: archive
//! overflow out of the window, recall relevant memories for the input,
//! compose the augmented system prompt, call the completion provider, and
//! commit the exchange. Archival strictly precedes composition so freshly
//! archived content never appears in both the memory block and the raw
//! window of the same request.
//!
//! `process_prompt` takes `&mut self`: one in-flight turn per conversation
//! is enforced at compile time rather than by an internal lock.

use std::fmt;
use std::sync::Arc;

use engram_config::MemoryConfig;
use engram_core::{
    CompletionProvider, CompletionRequest, ConversationEntry, EngramError, MemoryStats,
};
use engram_memory::{RecalledMemory, Relevance, SemanticStore};
use tracing::{debug, info, warn};

use crate::summarizer::Summarizer;

/// Phase of the current turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Archiving,
    Recalling,
    Composing,
    AwaitingCompletion,
    Committing,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnState::Idle => "idle",
            TurnState::Archiving => "archiving",
            TurnState::Recalling => "recalling",
            TurnState::Composing => "composing",
            TurnState::AwaitingCompletion => "awaiting-completion",
            TurnState::Committing => "committing",
        };
        f.write_str(name)
    }
}

/// Archival and recall policy, read once at construction.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Entries archived together as one chunk.
    pub chunk_size: usize,
    /// Live window bound that triggers archival.
    pub max_conversation_length: usize,
    /// Memories recalled per turn. Zero disables recall.
    pub recall_top_k: usize,
    /// Minimum importance for recall eligibility.
    pub importance_threshold: f64,
}

impl From<&MemoryConfig> for OrchestratorConfig {
    fn from(config: &MemoryConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            max_conversation_length: config.max_conversation_length,
            recall_top_k: config.recall_top_k,
            importance_threshold: config.importance_threshold,
        }
    }
}

/// The memory subsystem as seen by the orchestrator. `None` means
/// degraded mode: plain truncation, no archival, no recall.
pub struct MemoryBackend {
    store: Arc<SemanticStore>,
    summarizer: Summarizer,
}

impl MemoryBackend {
    pub fn new(store: Arc<SemanticStore>, summarizer: Summarizer) -> Self {
        Self { store, summarizer }
    }
}

/// Owns the live conversation and drives the turn cycle.
pub struct Orchestrator {
    config: OrchestratorConfig,
    conversation: Vec<ConversationEntry>,
    memory: Option<MemoryBackend>,
    provider: Arc<dyn CompletionProvider>,
    model: String,
    temperature: f32,
    state: TurnState,
}

impl Orchestrator {
    pub fn new(
        system_prompt: impl Into<String>,
        provider: Arc<dyn CompletionProvider>,
        model: impl Into<String>,
        temperature: f32,
        config: OrchestratorConfig,
        memory: Option<MemoryBackend>,
    ) -> Self {
        Self {
            config,
            conversation: vec![ConversationEntry::system(system_prompt)],
            memory,
            provider,
            model: model.into(),
            temperature,
            state: TurnState::Idle,
        }
    }

    /// Runs one full turn: archive, recall, compose, complete, commit.
    ///
    /// On completion failure the error is returned and the conversation is
    /// left exactly as it was after archival; the input is not committed
    /// and is not retried automatically.
    pub async fn process_prompt(&mut self, input: &str) -> Result<String, EngramError> {
        self.state = TurnState::Archiving;
        self.archive_overflow().await;

        self.state = TurnState::Recalling;
        let recalled = self.recall(input).await;

        self.state = TurnState::Composing;
        let composed = self.compose_system(&recalled);
        let mut messages = Vec::with_capacity(self.conversation.len() + 1);
        messages.push(ConversationEntry::system(composed));
        messages.extend(self.conversation[1..].iter().cloned());
        messages.push(ConversationEntry::user(input));

        self.state = TurnState::AwaitingCompletion;
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
        };
        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                self.state = TurnState::Idle;
                return Err(e);
            }
        };

        self.state = TurnState::Committing;
        self.conversation.push(ConversationEntry::user(input));
        self.conversation
            .push(ConversationEntry::assistant(response.content.clone()));
        self.state = TurnState::Idle;

        debug!(
            conversation_len = self.conversation.len(),
            recalled = recalled.len(),
            "turn committed"
        );
        Ok(response.content)
    }

    /// Moves overflow out of the live window, chunk by chunk.
    ///
    /// Degraded mode (no memory backend) truncates instead. A store
    /// failure leaves the pending chunk in place and truncates for this
    /// turn only.
    async fn archive_overflow(&mut self) {
        let max = self.config.max_conversation_length;
        if self.conversation.len() <= max {
            return;
        }

        let Some(memory) = &self.memory else {
            let dropped = truncate_window(&mut self.conversation, max);
            warn!(dropped, "memory disabled, truncated conversation without archival");
            return;
        };

        while self.conversation.len() > max {
            let len = self.conversation.len();
            // Never archive index 0 or the final in-progress exchange.
            let chunk_end = (1 + self.config.chunk_size).min(len.saturating_sub(2));
            if chunk_end <= 1 {
                break;
            }

            let chunk: Vec<ConversationEntry> = self.conversation[1..chunk_end].to_vec();
            let summary = memory.summarizer.summarize(&chunk).await;

            match memory
                .store
                .add(&summary.summary, &chunk, &summary.topic, None)
                .await
            {
                Ok(id) => {
                    self.conversation.drain(1..chunk_end);
                    info!(
                        record_id = %id,
                        archived = chunk.len(),
                        remaining = self.conversation.len(),
                        "conversation chunk archived"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "archival store failed, truncating for this turn");
                    truncate_window(&mut self.conversation, max);
                    break;
                }
            }
        }
    }

    /// Recalls memories relevant to `input`. Failures degrade to an empty
    /// recall rather than aborting the turn.
    async fn recall(&self, input: &str) -> Vec<RecalledMemory> {
        let Some(memory) = &self.memory else {
            return Vec::new();
        };
        if self.config.recall_top_k == 0 {
            return Vec::new();
        }

        match memory
            .store
            .query(input, self.config.recall_top_k, self.config.importance_threshold)
            .await
        {
            Ok(recalled) => recalled,
            Err(e) => {
                warn!(error = %e, "recall failed, continuing without memories");
                Vec::new()
            }
        }
    }

    /// Builds the outgoing system content: stored prompt, optional memory
    /// block, and a timestamp line (always present for temporal grounding).
    fn compose_system(&self, recalled: &[RecalledMemory]) -> String {
        let mut content = self.conversation[0].content.clone();

        if !recalled.is_empty() {
            content.push_str("\n\n[Recalled memories]");
            for (i, memory) in recalled.iter().enumerate() {
                let band = Relevance::from_distance(memory.distance);
                content.push_str(&format!(
                    "\n{}. [{}] {}",
                    i + 1,
                    band.as_str(),
                    memory.record.summary
                ));
            }
            content.push_str("\n[/Recalled memories]");
        }

        content.push_str(&format!(
            "\nCurrent time: {}",
            chrono::Local::now().to_rfc3339()
        ));
        content
    }

    /// Archives everything except entry 0 and the last `keep_last` entries
    /// as a single chunk. Returns the number of entries archived.
    ///
    /// Unlike automatic archival a store failure here is surfaced to the
    /// caller; the chunk is not removed.
    pub async fn force_archive(&mut self, keep_last: usize) -> Result<usize, EngramError> {
        let Some(memory) = &self.memory else {
            return Err(memory_disabled());
        };

        let end = self.conversation.len().saturating_sub(keep_last);
        if end <= 1 {
            return Ok(0);
        }

        let chunk: Vec<ConversationEntry> = self.conversation[1..end].to_vec();
        let summary = memory.summarizer.summarize(&chunk).await;
        let id = memory
            .store
            .add(&summary.summary, &chunk, &summary.topic, None)
            .await?;
        self.conversation.drain(1..end);
        info!(record_id = %id, archived = chunk.len(), "manual archival complete");
        Ok(chunk.len())
    }

    /// Archive statistics. Errors when memory is disabled.
    pub async fn get_stats(&self) -> Result<MemoryStats, EngramError> {
        match &self.memory {
            Some(memory) => memory.store.stats().await,
            None => Err(memory_disabled()),
        }
    }

    /// Searches the archive with no importance gate.
    pub async fn search_memories(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RecalledMemory>, EngramError> {
        match &self.memory {
            Some(memory) => memory.store.search(query, limit).await,
            None => Err(memory_disabled()),
        }
    }

    /// Deletes all archived memories. Returns the number deleted.
    pub async fn clear_memories(&self) -> Result<usize, EngramError> {
        match &self.memory {
            Some(memory) => memory.store.clear_all().await,
            None => Err(memory_disabled()),
        }
    }

    /// Shows what recall would inject for `input`, without running a turn.
    pub async fn preview_recall(
        &self,
        input: &str,
    ) -> Result<Vec<RecalledMemory>, EngramError> {
        match &self.memory {
            Some(memory) => {
                memory
                    .store
                    .query(input, self.config.recall_top_k, self.config.importance_threshold)
                    .await
            }
            None => Err(memory_disabled()),
        }
    }

    /// Replaces the system prompt in place. Entry 0 is never archived or
    /// deleted, only swapped.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.conversation[0] = ConversationEntry::system(prompt);
    }

    /// Drops every entry except the system prompt. The archive is untouched.
    pub fn clear_conversation(&mut self) {
        self.conversation.truncate(1);
    }

    pub fn conversation(&self) -> &[ConversationEntry] {
        &self.conversation
    }

    pub fn conversation_len(&self) -> usize {
        self.conversation.len()
    }

    pub fn memory_enabled(&self) -> bool {
        self.memory.is_some()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }
}

fn memory_disabled() -> EngramError {
    EngramError::Internal("memory subsystem is disabled".to_string())
}

/// Keeps entry 0 plus the last `max - 1` entries. Returns the number of
/// entries discarded.
fn truncate_window(conversation: &mut Vec<ConversationEntry>, max: usize) -> usize {
    if conversation.len() <= max || max == 0 {
        return 0;
    }
    let keep_tail = max - 1;
    let cut_end = conversation.len() - keep_tail;
    let dropped = cut_end - 1;
    conversation.drain(1..cut_end);
    dropped
}
