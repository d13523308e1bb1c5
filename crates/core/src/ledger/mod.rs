//! Persisted record of already-acquired tracks.
//!
//! The ledger is append-only from the engine's perspective: a track id is
//! inserted at most once, after a successful transfer enqueue, and rows
//! are never updated or deleted here. Reads happen at batch start, when
//! the caller filters the want-list.

mod sqlite;

pub use sqlite::SqliteLedger;

use std::collections::HashSet;

use thiserror::Error;

use crate::catalog::Track;

/// Errors from the ledger store.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger database error: {0}")]
    Database(String),
}

/// Append-only ledger of acquired track ids.
pub trait DownloadLedger: Send + Sync {
    /// Whether the track id has already been recorded.
    fn contains(&self, track_id: &str) -> Result<bool, LedgerError>;

    /// Record a successful acquisition. Recording an id twice is a no-op.
    fn record(&self, track: &Track) -> Result<(), LedgerError>;

    /// All recorded track ids, for batch-start dedup filtering.
    fn downloaded_ids(&self) -> Result<HashSet<String>, LedgerError>;
}
