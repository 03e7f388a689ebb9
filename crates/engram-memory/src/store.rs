// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed semantic store with vector BLOB storage.
//!
//! Append-only archive of memory records, queryable by semantic
//! similarity and by recency. Safe for concurrent `add` and `query` from
//! independent conversations: the underlying connection serializes all
//! access on its own worker thread.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use engram_core::{ConversationEntry, Embedder, EngramError, MemoryStats};
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::scorer::score_importance;
use crate::types::{blob_to_vec, cosine_distance, vec_to_blob, MemoryRecord, RecalledMemory};

/// Helper to convert tokio_rusqlite errors into EngramError::Store.
fn storage_err(e: tokio_rusqlite::Error) -> EngramError {
    EngramError::Store {
        source: Box::new(e),
    }
}

/// Schema for the memories table. Applied idempotently on open.
const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY NOT NULL,
    summary TEXT NOT NULL,
    topic TEXT NOT NULL DEFAULT '',
    timestamp REAL NOT NULL,
    message_count INTEGER NOT NULL,
    importance REAL NOT NULL,
    embedding BLOB NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_memories_timestamp ON memories(timestamp);
CREATE INDEX IF NOT EXISTS idx_memories_importance ON memories(importance);";

/// Column list shared by every full-record SELECT.
const COLUMNS: &str = "id, summary, topic, timestamp, message_count, importance, embedding";

/// Persistent semantic store for archived conversation chunks.
///
/// Records are embedded at insert time and ranked at query time by cosine
/// distance against the query embedding. The embedding backend is opaque
/// behind the [`Embedder`] trait.
pub struct SemanticStore {
    conn: Connection,
    embedder: Arc<dyn Embedder>,
}

impl SemanticStore {
    /// Open (or create) a store at the given path.
    ///
    /// Creates parent directories as needed and applies the schema. A
    /// failure here (unwritable directory, corrupt database) is returned
    /// to the caller, which is expected to degrade to memory-disabled
    /// operation rather than abort.
    pub async fn open(path: &Path, embedder: Arc<dyn Embedder>) -> Result<Self, EngramError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                EngramError::Config(format!(
                    "cannot create memory directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| EngramError::Store { source: Box::new(e) })?;
        Self::init_schema(&conn).await?;

        debug!(path = %path.display(), "semantic store opened");
        Ok(Self { conn, embedder })
    }

    /// Open an in-memory store. Used by tests and as a reference backend.
    pub async fn open_in_memory(embedder: Arc<dyn Embedder>) -> Result<Self, EngramError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| EngramError::Store { source: Box::new(e) })?;
        Self::init_schema(&conn).await?;
        Ok(Self { conn, embedder })
    }

    async fn init_schema(conn: &Connection) -> Result<(), EngramError> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(storage_err)
    }

    /// Archive a summarized chunk as a new record.
    ///
    /// Assigns a fresh id and the current timestamp, computes importance
    /// from the source messages when not supplied, embeds the summary,
    /// and persists the record. Returns the new record's id.
    pub async fn add(
        &self,
        summary: &str,
        source_messages: &[ConversationEntry],
        topic: &str,
        importance: Option<f64>,
    ) -> Result<String, EngramError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = epoch_now();
        let importance = importance.unwrap_or_else(|| score_importance(source_messages));
        let message_count = source_messages.len() as i64;

        let embedding = self
            .embedder
            .embed(std::slice::from_ref(&summary.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EngramError::Internal("embedder returned no vector".to_string()))?;
        let embedding_blob = vec_to_blob(&embedding);

        let record_id = id.clone();
        let summary = summary.to_string();
        let topic = topic.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO memories (id, summary, topic, timestamp, message_count, importance, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![id, summary, topic, timestamp, message_count, importance, embedding_blob],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)?;

        debug!(id = %record_id, message_count, importance, "memory record stored");
        Ok(record_id)
    }

    /// Query for the `top_k` records most similar to `text`.
    ///
    /// Results are ranked by ascending cosine distance, with ties broken
    /// deterministically by record id. Only records with
    /// `importance >= importance_threshold` are eligible. Zero matches is
    /// a valid outcome, not an error.
    pub async fn query(
        &self,
        text: &str,
        top_k: usize,
        importance_threshold: f64,
    ) -> Result<Vec<RecalledMemory>, EngramError> {
        if top_k == 0 {
            return Ok(vec![]);
        }

        let query_embedding = self
            .embedder
            .embed(std::slice::from_ref(&text.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EngramError::Internal("embedder returned no vector".to_string()))?;

        let candidates = self
            .conn
            .call(move |conn| {
                let sql = format!(
                    "SELECT {COLUMNS} FROM memories WHERE importance >= ?1"
                );
                let mut stmt = conn.prepare(&sql)?;
                let records = stmt
                    .query_map(rusqlite::params![importance_threshold], row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(storage_err)?;

        let mut recalled: Vec<RecalledMemory> = candidates
            .into_iter()
            .filter(|r| r.embedding.len() == query_embedding.len())
            .map(|record| {
                let distance = cosine_distance(&query_embedding, &record.embedding);
                RecalledMemory { record, distance }
            })
            .collect();

        recalled.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });
        recalled.truncate(top_k);

        Ok(recalled)
    }

    /// User-facing search: same ranking as [`Self::query`] with no importance gate.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RecalledMemory>, EngramError> {
        self.query(query, limit, 0.0).await
    }

    /// The `n` most recent records, newest first.
    pub async fn recent(&self, n: usize) -> Result<Vec<MemoryRecord>, EngramError> {
        self.conn
            .call(move |conn| {
                let sql = format!(
                    "SELECT {COLUMNS} FROM memories ORDER BY timestamp DESC, id LIMIT ?1"
                );
                let mut stmt = conn.prepare(&sql)?;
                let records = stmt
                    .query_map(rusqlite::params![n as i64], row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(storage_err)
    }

    /// Aggregate statistics over all stored records.
    pub async fn stats(&self) -> Result<MemoryStats, EngramError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT COUNT(*), AVG(importance), MIN(timestamp), MAX(timestamp) FROM memories",
                )?;
                let stats = stmt.query_row([], |row| {
                    let count: i64 = row.get(0)?;
                    let avg: Option<f64> = row.get(1)?;
                    let oldest: Option<f64> = row.get(2)?;
                    let newest: Option<f64> = row.get(3)?;
                    Ok(MemoryStats {
                        count: count as usize,
                        avg_importance: avg.unwrap_or(0.0),
                        oldest,
                        newest,
                    })
                })?;
                Ok(stats)
            })
            .await
            .map_err(storage_err)
    }

    /// Delete all records. Returns the number deleted.
    pub async fn clear_all(&self) -> Result<usize, EngramError> {
        self.conn
            .call(|conn| {
                let deleted = conn.execute("DELETE FROM memories", [])?;
                Ok(deleted)
            })
            .await
            .map_err(storage_err)
    }

    /// Delete records older than `days` days. Returns the number deleted.
    pub async fn cleanup_older_than(&self, days: u64) -> Result<usize, EngramError> {
        let cutoff = epoch_now() - (days as f64 * 86_400.0);
        self.conn
            .call(move |conn| {
                let deleted =
                    conn.execute("DELETE FROM memories WHERE timestamp < ?1", [cutoff])?;
                Ok(deleted)
            })
            .await
            .map_err(storage_err)
    }

    /// Test hook: overwrite a record's timestamp.
    #[cfg(test)]
    async fn set_timestamp(&self, id: &str, timestamp: f64) -> Result<(), EngramError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE memories SET timestamp = ?1 WHERE id = ?2",
                    rusqlite::params![timestamp, id],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }
}

/// Current time as epoch seconds.
fn epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Convert a rusqlite row to a MemoryRecord.
fn row_to_record(row: &rusqlite::Row) -> Result<MemoryRecord, rusqlite::Error> {
    let embedding_blob: Vec<u8> = row.get(6)?;
    Ok(MemoryRecord {
        id: row.get(0)?,
        summary: row.get(1)?,
        topic: row.get(2)?,
        timestamp: row.get(3)?,
        message_count: row.get(4)?,
        importance: row.get(5)?,
        embedding: blob_to_vec(&embedding_blob),
    })
}
