// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Engram configuration system.

use engram_config::diagnostic::{suggest_key, ConfigError};
use engram_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_engram_config() {
    let toml = r#"
[agent]
name = "aria"
user_name = "sam"
user_description = "a test user"
log_level = "debug"
system_prompt = "You are $AI_NAME, helping $USER_NAME."

[provider]
base_url = "http://localhost:8080"
model = "test-model"
api_key = "sk-test-123"
timeout_secs = 30
temperature = 0.5

[memory]
enabled = true
persist_path = "/tmp/engram-test.db"
chunk_size = 6
max_conversation_length = 40
recall_top_k = 5
importance_threshold = 0.4
cleanup_days = 14
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "aria");
    assert_eq!(config.agent.user_name, "sam");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(
        config.agent.system_prompt.as_deref(),
        Some("You are $AI_NAME, helping $USER_NAME.")
    );
    assert_eq!(config.provider.base_url, "http://localhost:8080");
    assert_eq!(config.provider.api_key.as_deref(), Some("sk-test-123"));
    assert_eq!(config.provider.timeout_secs, 30);
    assert_eq!(config.memory.persist_path, "/tmp/engram-test.db");
    assert_eq!(config.memory.chunk_size, 6);
    assert_eq!(config.memory.max_conversation_length, 40);
    assert_eq!(config.memory.recall_top_k, 5);
    assert_eq!(config.memory.importance_threshold, 0.4);
    assert_eq!(config.memory.cleanup_days, 14);
}

/// Empty TOML falls back to compiled defaults everywhere.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.agent.name, "engram");
    assert_eq!(config.memory.max_conversation_length, 100);
    assert_eq!(config.memory.chunk_size, 4);
}

/// Unknown field in [memory] section produces an error mentioning the key.
#[test]
fn unknown_field_in_memory_produces_error() {
    let toml = r#"
[memory]
chunk_sise = 4
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("chunk_sise"),
        "error should mention the bad key, got: {err_str}"
    );
}

/// Unknown keys become UnknownKey diagnostics with a fuzzy suggestion.
#[test]
fn unknown_key_diagnostic_carries_suggestion() {
    let toml = r#"
[memory]
chunk_sise = 4
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce diagnostics");
    let unknown = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => Some((key.clone(), suggestion.clone())),
        _ => None,
    });
    let (key, suggestion) = unknown.expect("expected an UnknownKey diagnostic");
    assert!(key.contains("chunk_sise"));
    assert_eq!(suggestion.as_deref(), Some("chunk_size"));
}

/// Semantic validation failures are surfaced as Validation diagnostics.
#[test]
fn validation_errors_surface_through_load_and_validate() {
    let toml = r#"
[memory]
chunk_size = 0
importance_threshold = 2.0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("chunk_size"))));
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("importance_threshold"))
    ));
}

/// Wrong value types are rejected by figment.
#[test]
fn wrong_type_rejected() {
    let toml = r#"
[memory]
chunk_size = "four"
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// suggest_key is exported for diagnostic consumers.
#[test]
fn suggest_key_exported_and_working() {
    assert_eq!(
        suggest_key("persit_path", &["persist_path", "enabled"]),
        Some("persist_path".to_string())
    );
}
