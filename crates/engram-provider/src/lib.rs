// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible completion provider for engram.
//!
//! [`OpenAiProvider`] adapts any server speaking the OpenAI chat
//! completions wire format (llama.cpp, vLLM, LM Studio, OpenAI itself)
//! to the [`CompletionProvider`] trait.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use engram_config::ProviderConfig;
use engram_core::{CompletionProvider, CompletionRequest, CompletionResponse, EngramError};
use tracing::debug;

use crate::client::ChatClient;
use crate::types::{ApiMessage, ChatCompletionRequest};

/// Completion provider backed by an OpenAI-compatible HTTP server.
pub struct OpenAiProvider {
    client: ChatClient,
}

impl OpenAiProvider {
    /// Builds a provider from configuration.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, EngramError> {
        let client = ChatClient::new(
            config.base_url.clone(),
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, EngramError> {
        let wire = ChatCompletionRequest {
            model: request.model,
            messages: request
                .messages
                .iter()
                .map(|entry| ApiMessage {
                    role: entry.role.as_str().to_string(),
                    content: entry.content.clone(),
                })
                .collect(),
            temperature: request.temperature,
            stream: false,
        };

        let response = self.client.complete(&wire).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| EngramError::Provider {
                message: "completion response contained no choices".into(),
                source: None,
            })?;

        debug!(chars = content.len(), "completion received");
        Ok(CompletionResponse { content })
    }
}
