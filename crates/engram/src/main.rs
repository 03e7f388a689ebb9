// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engram - a conversational agent with durable semantic memory.
//!
//! This is the binary entry point for the engram agent.

mod admin;
mod commands;
mod shell;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Engram - a conversational agent with durable semantic memory.
#[derive(Parser, Debug)]
#[command(name = "engram", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session (the default).
    Shell,
    /// Show memory archive statistics.
    Stats,
    /// Search the memory archive.
    Search {
        /// Query text.
        query: String,
        /// Maximum number of results.
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Delete all archived memories.
    Clear {
        /// Required; deletion is irreversible.
        #[arg(long)]
        confirm: bool,
    },
    /// Delete memories older than a threshold.
    Cleanup {
        /// Age threshold in days. Defaults to `memory.cleanup_days`.
        #[arg(long)]
        days: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match engram_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            engram_config::render_errors(errors);
            std::process::exit(1);
        }
    };

    // ENGRAM_LOG overrides the configured level.
    let filter = EnvFilter::try_from_env("ENGRAM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.agent.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        None | Some(Commands::Shell) => shell::run_shell(config).await,
        Some(Commands::Stats) => admin::stats(&config).await,
        Some(Commands::Search { query, limit }) => admin::search(&config, &query, limit).await,
        Some(Commands::Clear { confirm }) => admin::clear(&config, confirm).await,
        Some(Commands::Cleanup { days }) => {
            admin::cleanup(&config, days.unwrap_or(config.memory.cleanup_days)).await
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
