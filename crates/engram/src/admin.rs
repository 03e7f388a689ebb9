// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot archive administration commands.
//!
//! These operate directly on the semantic store without starting a
//! session; unlike the shell, a store that cannot open is a hard error
//! here since the store is the whole point of the command.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use engram_config::EngramConfig;
use engram_core::EngramError;
use engram_memory::{HashEmbedder, Relevance, SemanticStore};

async fn open_store(config: &EngramConfig) -> Result<SemanticStore, EngramError> {
    if !config.memory.enabled {
        return Err(EngramError::Config(
            "memory subsystem is disabled in configuration".to_string(),
        ));
    }
    SemanticStore::open(
        Path::new(&config.memory.persist_path),
        Arc::new(HashEmbedder::new()),
    )
    .await
}

pub async fn stats(config: &EngramConfig) -> Result<(), EngramError> {
    let store = open_store(config).await?;
    let stats = store.stats().await?;
    println!("database:       {}", config.memory.persist_path);
    println!("memories:       {}", stats.count);
    println!("avg importance: {:.3}", stats.avg_importance);
    println!("oldest:         {}", crate::shell::format_epoch(stats.oldest));
    println!("newest:         {}", crate::shell::format_epoch(stats.newest));
    Ok(())
}

pub async fn search(config: &EngramConfig, query: &str, limit: usize) -> Result<(), EngramError> {
    let store = open_store(config).await?;
    let results = store.search(query, limit).await?;
    if results.is_empty() {
        println!("no matches");
        return Ok(());
    }
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
    Ok(())
}

pub async fn clear(config: &EngramConfig, confirm: bool) -> Result<(), EngramError> {
    if !confirm {
        eprintln!(
            "{}",
            "this deletes every archived memory; re-run with --confirm".yellow()
        );
        return Ok(());
    }
    let store = open_store(config).await?;
    let deleted = store.clear_all().await?;
    println!("deleted {deleted} memories");
    Ok(())
}

pub async fn cleanup(config: &EngramConfig, days: u64) -> Result<(), EngramError> {
    let store = open_store(config).await?;
    let deleted = store.cleanup_older_than(days).await?;
    println!("deleted {deleted} memories older than {days} days");
    Ok(())
}
