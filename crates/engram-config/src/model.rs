// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Engram agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Engram configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngramConfig {
    /// Agent identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Completion provider endpoint settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Memory subsystem settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent, substituted for `$AI_NAME` in prompts.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Name of the user, substituted for `$USER_NAME` in prompts.
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Free-form description of the user, substituted for `$USER_DESCRIPTION`.
    #[serde(default)]
    pub user_description: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt template. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt template.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            user_name: default_user_name(),
            user_description: String::new(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "engram".to_string()
}

fn default_user_name() -> String {
    "user".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Completion provider endpoint configuration.
///
/// The agent talks to any OpenAI-compatible chat-completions endpoint;
/// the defaults point at a local inference server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL of the endpoint (the `/v1/chat/completions` path is appended).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier to request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token for the endpoint. `None` sends no Authorization header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature for main completion calls.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:7777".to_string()
}

fn default_model() -> String {
    "local".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.7
}

/// Memory subsystem configuration.
///
/// `chunk_size`, `max_conversation_length`, `recall_top_k`, and
/// `importance_threshold` become the orchestrator's archival and recall
/// policy; they are read once at construction and immutable thereafter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable the memory subsystem. When false the agent runs degraded:
    /// plain window truncation, no archival, no recall.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Path to the SQLite database backing the semantic store.
    #[serde(default = "default_persist_path")]
    pub persist_path: String,

    /// Number of conversation entries archived together as one chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum live conversation length before archival kicks in.
    #[serde(default = "default_max_conversation_length")]
    pub max_conversation_length: usize,

    /// Number of memories recalled per turn. Zero disables recall.
    #[serde(default = "default_recall_top_k")]
    pub recall_top_k: usize,

    /// Minimum importance for a record to be eligible for recall (0.0-1.0).
    #[serde(default)]
    pub importance_threshold: f64,

    /// Age threshold in days for the `cleanup` command.
    #[serde(default = "default_cleanup_days")]
    pub cleanup_days: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            persist_path: default_persist_path(),
            chunk_size: default_chunk_size(),
            max_conversation_length: default_max_conversation_length(),
            recall_top_k: default_recall_top_k(),
            importance_threshold: 0.0,
            cleanup_days: default_cleanup_days(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_persist_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("engram").join("memory.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "engram-memory.db".to_string())
}

fn default_chunk_size() -> usize {
    4
}

fn default_max_conversation_length() -> usize {
    100
}

fn default_recall_top_k() -> usize {
    3
}

fn default_cleanup_days() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = EngramConfig::default();
        assert_eq!(config.agent.name, "engram");
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.provider.base_url, "http://localhost:7777");
        assert_eq!(config.provider.timeout_secs, 120);
        assert!(config.memory.enabled);
        assert_eq!(config.memory.chunk_size, 4);
        assert_eq!(config.memory.max_conversation_length, 100);
        assert_eq!(config.memory.recall_top_k, 3);
        assert_eq!(config.memory.importance_threshold, 0.0);
    }

    #[test]
    fn persist_path_is_never_empty_by_default() {
        let config = MemoryConfig::default();
        assert!(!config.persist_path.trim().is_empty());
    }
}
