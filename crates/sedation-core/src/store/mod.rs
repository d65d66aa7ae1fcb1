//! Durable snapshot store.
//!
//! One SQLite database, one named slot. The store never interprets the
//! snapshot beyond JSON (de)serialization; the two row tables travel
//! inside it as opaque fragments the session rehydrates verbatim.

mod schema;
mod snapshot;

pub use schema::SCHEMA;
pub use snapshot::Snapshot;

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Database connection wrapper owning the snapshot slot.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open the store at path, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Write the snapshot into the slot, replacing any previous one.
    pub fn persist(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let payload = snapshot.to_json()?;
        self.conn.execute(
            r#"
            INSERT INTO record_snapshot (id, payload, saved_at)
            VALUES (1, ?1, datetime('now'))
            ON CONFLICT (id) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            "#,
            [payload],
        )?;
        Ok(())
    }

    /// Read the slot. A present-but-unparsable payload recovers to None
    /// with a warning; it is never surfaced as a blocking error.
    pub fn load(&self) -> StoreResult<Option<Snapshot>> {
        let payload: Option<String> = self
            .conn
            .query_row("SELECT payload FROM record_snapshot WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        match Snapshot::from_json(&payload) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                tracing::warn!(%err, "malformed snapshot discarded; starting from an empty record");
                Ok(None)
            }
        }
    }

    /// Delete the slot entirely. The caller is expected to discard all
    /// in-memory state afterwards: this is a full reset, not a rollback.
    pub fn clear(&self) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM record_snapshot WHERE id = 1", [])?;
        Ok(())
    }

    /// Raw payload currently in the slot, if any.
    pub fn raw_payload(&self) -> StoreResult<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT payload FROM record_snapshot WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?)
    }
}
