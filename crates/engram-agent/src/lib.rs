// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn orchestration and memory lifecycle for engram.
//!
//! The [`Orchestrator`] drives one turn at a time over an exclusive live
//! conversation window, archiving overflow into the semantic store via
//! the [`Summarizer`] and recalling relevant memories back into each
//! outgoing prompt. [`template`] renders the configured system prompt.

pub mod orchestrator;
pub mod summarizer;
pub mod template;

pub use orchestrator::{MemoryBackend, Orchestrator, OrchestratorConfig, TurnState};
pub use summarizer::Summarizer;
pub use template::{render_prompt, render_template, PromptVars};
