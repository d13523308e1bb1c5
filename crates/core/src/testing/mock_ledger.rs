//! In-memory download ledger for testing.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::catalog::Track;
use crate::ledger::{DownloadLedger, LedgerError};

/// Ledger that keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    ids: Mutex<HashSet<String>>,
    records: Mutex<Vec<(String, String)>>,
    fail_next: Mutex<bool>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next record call.
    pub fn fail_next_record(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    /// (id, title) pairs in record order, duplicates included.
    pub fn records(&self) -> Vec<(String, String)> {
        self.records.lock().unwrap().clone()
    }

    /// Number of record calls that succeeded.
    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl DownloadLedger for MemoryLedger {
    fn contains(&self, track_id: &str) -> Result<bool, LedgerError> {
        Ok(self.ids.lock().unwrap().contains(track_id))
    }

    fn record(&self, track: &Track) -> Result<(), LedgerError> {
        let mut fail_next = self.fail_next.lock().unwrap();
        if *fail_next {
            *fail_next = false;
            return Err(LedgerError::Database("injected failure".to_string()));
        }
        drop(fail_next);

        self.ids.lock().unwrap().insert(track.id.clone());
        self.records
            .lock()
            .unwrap()
            .push((track.id.clone(), track.title.clone()));
        Ok(())
    }

    fn downloaded_ids(&self) -> Result<HashSet<String>, LedgerError> {
        Ok(self.ids.lock().unwrap().clone())
    }
}
