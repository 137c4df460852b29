//! Retrieval: chunk index with ranked full-text search.
//!
//! Backs the document helper's retrieval mode. The index lives in an
//! in-memory SQLite database with an FTS5 virtual table and BM25 ranking;
//! nothing is persisted across process restarts. Re-indexing a document
//! whose content is unchanged is a no-op (SHA-256 content fingerprint).

pub mod chunker;

pub use chunker::{TextChunk, chunk_text};

use std::collections::HashMap;

use rusqlite::{Connection, params};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::AppError;

/// A single search hit: the matched chunk text, its parent document, its
/// byte offset in that document, and a relevance score (higher = more
/// relevant).
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub text: String,
    pub doc_id: String,
    pub position: usize,
    pub score: f32,
}

pub struct ChunkIndex {
    conn: Connection,
    /// doc_id to SHA-256 of the content last indexed for it.
    content_hashes: HashMap<String, String>,
}

impl ChunkIndex {
    /// Open a fresh in-memory index.
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Index(format!("open in-memory db: {e}")))?;
        conn.execute_batch(
            "CREATE VIRTUAL TABLE chunks USING fts5(
                id UNINDEXED,
                doc_id UNINDEXED,
                text,
                position UNINDEXED
            );",
        )
        .map_err(|e| AppError::Index(format!("initialize schema: {e}")))?;

        Ok(Self {
            conn,
            content_hashes: HashMap::new(),
        })
    }

    /// Index `chunks` for `doc_id`, replacing any previous chunks of the
    /// same document. Returns `false` without touching the index when
    /// `content` matches what is already indexed.
    pub fn index(
        &mut self,
        doc_id: &str,
        content: &str,
        chunks: &[TextChunk],
    ) -> Result<bool, AppError> {
        let hash = sha256_hex(content);
        if self.content_hashes.get(doc_id) == Some(&hash) {
            debug!(%doc_id, "content unchanged, skipping re-index");
            return Ok(false);
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Index(format!("begin index tx: {e}")))?;

        tx.execute("DELETE FROM chunks WHERE doc_id = ?1", params![doc_id])
            .map_err(|e| AppError::Index(format!("clear chunks for {doc_id}: {e}")))?;

        for chunk in chunks {
            tx.execute(
                "INSERT INTO chunks (id, doc_id, text, position) VALUES (?1, ?2, ?3, ?4)",
                params![
                    uuid::Uuid::now_v7().to_string(),
                    doc_id,
                    chunk.text,
                    chunk.position as i64
                ],
            )
            .map_err(|e| AppError::Index(format!("insert chunk: {e}")))?;
        }

        tx.commit()
            .map_err(|e| AppError::Index(format!("commit index tx: {e}")))?;

        self.content_hashes.insert(doc_id.to_string(), hash);
        info!(%doc_id, chunks = chunks.len(), "document indexed");
        Ok(true)
    }

    /// Top-`top_k` chunks for `query`, ordered by descending relevance.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, AppError> {
        if query.trim().is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let escaped = build_match_query(query);
        let mut stmt = self
            .conn
            .prepare(
                "SELECT text, doc_id, position, bm25(chunks) AS rank
                 FROM chunks
                 WHERE chunks MATCH ?1
                 ORDER BY rank
                 LIMIT ?2",
            )
            .map_err(|e| AppError::Index(format!("prepare search: {e}")))?;

        let rows = stmt
            .query_map(params![escaped, top_k as i64], |row| {
                let rank: f64 = row.get(3)?;
                Ok(SearchResult {
                    text: row.get(0)?,
                    doc_id: row.get(1)?,
                    position: row.get::<_, i64>(2)? as usize,
                    // BM25 rank is negative-is-better; negate so higher = more relevant.
                    score: (-rank) as f32,
                })
            })
            .map_err(|e| AppError::Index(format!("execute search: {e}")))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| AppError::Index(format!("map search row: {e}")))?);
        }
        Ok(results)
    }

    /// Drop one document's chunks from the index.
    pub fn remove(&mut self, doc_id: &str) -> Result<(), AppError> {
        self.conn
            .execute("DELETE FROM chunks WHERE doc_id = ?1", params![doc_id])
            .map_err(|e| AppError::Index(format!("delete chunks for {doc_id}: {e}")))?;
        self.content_hashes.remove(doc_id);
        Ok(())
    }

    /// Empty the index entirely.
    pub fn clear(&mut self) -> Result<(), AppError> {
        self.conn
            .execute("DELETE FROM chunks", [])
            .map_err(|e| AppError::Index(format!("clear index: {e}")))?;
        self.content_hashes.clear();
        Ok(())
    }
}

impl std::fmt::Debug for ChunkIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkIndex")
            .field("documents", &self.content_hashes.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Turn a free-text query into an FTS5 `MATCH` expression.
///
/// Tokens are OR-ed so a natural-language question ranks by how many of its
/// words a chunk contains (BM25), instead of requiring every word to be
/// present.
fn build_match_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(escape_fts5_token)
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Escape one token for the FTS5 query mini-language.
///
/// FTS5 parses the `MATCH` argument itself, so characters like `?`, `"`,
/// `(` are significant; parameter binding protects against SQL injection
/// but not FTS syntax errors. Any token containing a non-alphanumeric
/// character is wrapped in double-quotes with internal quotes doubled.
fn escape_fts5_token(tok: &str) -> String {
    if tok.chars().all(|c| c.is_alphanumeric()) {
        tok.to_string()
    } else {
        let escaped = tok.replace('"', "\"\"");
        format!("\"{escaped}\"")
    }
}
