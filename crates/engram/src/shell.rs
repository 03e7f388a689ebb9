// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `engram shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline
//! history. Builds the memory backend if enabled; a store that fails to
//! open degrades the session to memory-disabled operation instead of
//! aborting.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use engram_agent::{
    render_prompt, MemoryBackend, Orchestrator, OrchestratorConfig, PromptVars, Summarizer,
};
use engram_config::{AgentConfig, EngramConfig};
use engram_core::{CompletionProvider, EngramError};
use engram_memory::{HashEmbedder, Relevance, SemanticStore};
use engram_provider::OpenAiProvider;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};

use crate::commands::{self, ShellCommand, FORCE_ARCHIVE_KEEP_LAST, HELP_TEXT};

/// Default system prompt template when none is configured.
const DEFAULT_SYSTEM_PROMPT: &str = "\
You are $AI_NAME, a personal assistant for $USER_NAME. $USER_DESCRIPTION
Be concise, direct, and honest. You have access to recalled memories from \
past conversations when they are relevant.";

/// Runs the interactive REPL.
pub async fn run_shell(config: EngramConfig) -> Result<(), EngramError> {
    let provider: Arc<dyn CompletionProvider> =
        Arc::new(OpenAiProvider::from_config(&config.provider)?);

    let memory = build_memory(&config, provider.clone()).await;
    let system_prompt = resolve_system_prompt(&config.agent).await?;

    let mut orchestrator = Orchestrator::new(
        system_prompt,
        provider,
        config.provider.model.clone(),
        config.provider.temperature,
        OrchestratorConfig::from(&config.memory),
        memory,
    );

    let mut rl = DefaultEditor::new()
        .map_err(|e| EngramError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    if !orchestrator.memory_enabled() {
        println!("{}", "memory disabled: running without archival or recall".yellow());
    }
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match commands::parse(trimmed) {
                    Some(ShellCommand::Quit) => break,
                    Some(command) => handle_command(&mut orchestrator, command).await,
                    None => match orchestrator.process_prompt(trimmed).await {
                        Ok(reply) => println!("{reply}\n"),
                        Err(e) => eprintln!("{}: {e}", "error".red()),
                    },
                }
            }
            // Ctrl+C / Ctrl+D
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Builds the memory backend, or `None` when disabled or unavailable.
async fn build_memory(
    config: &EngramConfig,
    provider: Arc<dyn CompletionProvider>,
) -> Option<MemoryBackend> {
    if !config.memory.enabled {
        info!("memory subsystem disabled by configuration");
        return None;
    }

    match SemanticStore::open(
        Path::new(&config.memory.persist_path),
        Arc::new(HashEmbedder::new()),
    )
    .await
    {
        Ok(store) => {
            let summarizer = Summarizer::new(provider, config.provider.model.clone());
            Some(MemoryBackend::new(Arc::new(store), summarizer))
        }
        Err(e) => {
            warn!(error = %e, "memory store unavailable, continuing degraded");
            None
        }
    }
}

/// Resolves the system prompt: file, then inline config, then the default
/// template; always rendered against the configured identity variables.
async fn resolve_system_prompt(agent: &AgentConfig) -> Result<String, EngramError> {
    let template = if let Some(path) = &agent.system_prompt_file {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EngramError::Config(format!("cannot read system prompt file {path}: {e}")))?
    } else if let Some(inline) = &agent.system_prompt {
        inline.clone()
    } else {
        DEFAULT_SYSTEM_PROMPT.to_string()
    };

    let vars = PromptVars {
        user_name: agent.user_name.clone(),
        ai_name: agent.name.clone(),
        user_description: agent.user_description.clone(),
    };
    Ok(render_prompt(&template, &vars))
}

async fn handle_command(orchestrator: &mut Orchestrator, command: ShellCommand<'_>) {
    match command {
        ShellCommand::Help => println!("{HELP_TEXT}\n"),
        ShellCommand::ClearConversation => {
            orchestrator.clear_conversation();
            println!("conversation cleared\n");
        }
        ShellCommand::SetSystem(prompt) => {
            if prompt.is_empty() {
                eprintln!("{}: usage: /system <prompt>", "error".red());
            } else {
                orchestrator.set_system_prompt(prompt);
                println!("system prompt replaced\n");
            }
        }
        ShellCommand::MemoryStats => match orchestrator.get_stats().await {
            Ok(stats) => {
                println!("memories:       {}", stats.count);
                println!("avg importance: {:.3}", stats.avg_importance);
                println!("oldest:         {}", format_epoch(stats.oldest));
                println!("newest:         {}\n", format_epoch(stats.newest));
            }
            Err(e) => eprintln!("{}: {e}", "error".red()),
        },
        ShellCommand::MemorySearch(query) => {
            if query.is_empty() {
                eprintln!("{}: usage: /memory-search <query>", "error".red());
                return;
            }
            match orchestrator.search_memories(query, 5).await {
                Ok(results) if results.is_empty() => println!("no matches\n"),
                Ok(results) => {
                    print_recalled(&results);
                    println!();
                }
                Err(e) => eprintln!("{}: {e}", "error".red()),
            }
        }
        ShellCommand::MemoryPreview(query) => {
            if query.is_empty() {
                eprintln!("{}: usage: /memory-preview <query>", "error".red());
                return;
            }
            match orchestrator.preview_recall(query).await {
                Ok(results) if results.is_empty() => println!("nothing would be recalled\n"),
                Ok(results) => {
                    print_recalled(&results);
                    println!();
                }
                Err(e) => eprintln!("{}: {e}", "error".red()),
            }
        }
        ShellCommand::MemoryForce => {
            match orchestrator.force_archive(FORCE_ARCHIVE_KEEP_LAST).await {
                Ok(0) => println!("nothing to archive\n"),
                Ok(n) => println!("archived {n} entries\n"),
                Err(e) => eprintln!("{}: {e}", "error".red()),
            }
        }
        ShellCommand::MemoryClear { confirmed: false } => {
            println!(
                "this deletes every archived memory; type {} to proceed\n",
                "/memory-clear confirm".yellow()
            );
        }
        ShellCommand::MemoryClear { confirmed: true } => {
            match orchestrator.clear_memories().await {
                Ok(n) => println!("deleted {n} memories\n"),
                Err(e) => eprintln!("{}: {e}", "error".red()),
            }
        }
        ShellCommand::Unknown(command) => {
            eprintln!("{}: unknown command {command}, try /help", "error".red());
        }
        // Quit is handled by the caller.
        ShellCommand::Quit => {}
    }
}

fn print_recalled(results: &[engram_memory::RecalledMemory]) {
    for (i, memory) in results.iter().enumerate() {
        let band = Relevance::from_distance(memory.distance);
        println!(
            "{}. [{}] {} {}",
            i + 1,
            band.as_str(),
            memory.record.summary,
            format!("(distance {:.3})", memory.distance).dimmed()
        );
    }
}

/// Formats an epoch-seconds timestamp for display.
pub(crate) fn format_epoch(timestamp: Option<f64>) -> String {
    match timestamp.and_then(|t| chrono::DateTime::from_timestamp(t as i64, 0)) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "-".to_string(),
    }
}
