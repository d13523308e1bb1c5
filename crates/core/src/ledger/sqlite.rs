//! SQLite-backed download ledger.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::catalog::Track;

use super::{DownloadLedger, LedgerError};

/// SQLite-backed download ledger.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open (or create) the ledger database at the given path.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let conn = Connection::open(path).map_err(|e| LedgerError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory ledger (useful for testing).
    pub fn in_memory() -> Result<Self, LedgerError> {
        let conn =
            Connection::open_in_memory().map_err(|e| LedgerError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), LedgerError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS downloaded_tracks (
                track_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                downloaded_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| LedgerError::Database(e.to_string()))
    }
}

impl DownloadLedger for SqliteLedger {
    fn contains(&self, track_id: &str) -> Result<bool, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT 1 FROM downloaded_tracks WHERE track_id = ?")
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        stmt.exists(params![track_id])
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    fn record(&self, track: &Track) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO downloaded_tracks (track_id, title, downloaded_at)
             VALUES (?, ?, ?)",
            params![track.id, track.title, Utc::now().to_rfc3339()],
        )
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(())
    }

    fn downloaded_ids(&self) -> Result<HashSet<String>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT track_id FROM downloaded_tracks")
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row.map_err(|e| LedgerError::Database(e.to_string()))?);
        }
        Ok(ids)
    }
}
