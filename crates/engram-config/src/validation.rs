// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as value ranges for the archival policy and a usable
//! persistence path.

use crate::diagnostic::ConfigError;
use crate::model::EngramConfig;

/// Valid logging levels accepted for `agent.log_level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &EngramConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.agent.log_level
            ),
        });
    }

    if config.provider.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "provider.base_url must not be empty".to_string(),
        });
    }

    if config.provider.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "provider.timeout_secs must be greater than zero".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&config.provider.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "provider.temperature must be in [0.0, 2.0], got {}",
                config.provider.temperature
            ),
        });
    }

    if config.memory.chunk_size < 1 {
        errors.push(ConfigError::Validation {
            message: "memory.chunk_size must be at least 1".to_string(),
        });
    }

    if config.memory.max_conversation_length < 2 {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.max_conversation_length must be at least 2 (system prompt plus one exchange), got {}",
                config.memory.max_conversation_length
            ),
        });
    }

    if !(0.0..=1.0).contains(&config.memory.importance_threshold) {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.importance_threshold must be in [0.0, 1.0], got {}",
                config.memory.importance_threshold
            ),
        });
    }

    if config.memory.enabled && config.memory.persist_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "memory.persist_path must not be empty when memory is enabled".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
