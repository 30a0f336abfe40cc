//! SQLite-backed document store.
//!
//! Every collection lives in one `documents` table keyed by
//! `(collection, id)`, with the document kept as JSON text. Field queries use
//! SQLite's built-in `json_extract`, so stored documents keep whatever shape
//! the web application gives them.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use keeper_core::{DocumentStore, KeeperError};
use rusqlite::{Connection, params};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
     collection  TEXT NOT NULL,
     id          TEXT NOT NULL,
     body        TEXT NOT NULL,
     updated_at  INTEGER NOT NULL,
     PRIMARY KEY (collection, id)
 );";

pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .context("Failed to open SQLite document database")?;
        conn.execute_batch(&format!("PRAGMA journal_mode=WAL;\n{SCHEMA}"))
            .context("Failed to initialize documents schema")?;

        info!("SqliteDocumentStore opened at {:?}", path.as_ref());
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

/// JSON path for a top-level field. Field names are restricted so they can
/// be embedded in the path literal.
fn field_path(field: &str) -> Result<String, KeeperError> {
    if !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(format!("$.{field}"))
    } else {
        Err(KeeperError::Storage(format!("unsupported query field: {field:?}")))
    }
}

fn parse_bodies(bodies: Vec<String>) -> Result<Vec<Value>> {
    bodies
        .iter()
        .map(|b| serde_json::from_str(b).context("Corrupt document body"))
        .collect()
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn query_by_field(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Value>> {
        let path = field_path(field)?;
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT body FROM documents
             WHERE collection = ?1 AND json_extract(body, ?2) = ?3
             ORDER BY id",
        )?;
        let bodies = stmt
            .query_map(params![collection, path, value], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        parse_bodies(bodies)
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        let body = serde_json::to_string(&document)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO documents (collection, id, body, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(collection, id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![collection, id, body, Utc::now().timestamp_millis()],
        )
        .with_context(|| format!("Failed to write {collection}/{id}"))?;
        debug!("Wrote document {}/{}", collection, id);
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY id")?;
        let bodies = stmt
            .query_map(params![collection], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        parse_bodies(bodies)
    }
}
