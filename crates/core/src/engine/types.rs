//! Types for the acquisition engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag for a running batch.
///
/// Checked at every tier boundary and every poll iteration. Once tripped,
/// the in-flight track ends Missed and no further tracks are started.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Tally of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquireReport {
    /// Tracks handed to the transfer queue.
    pub acquired: usize,
    /// Tracks that ended without a match.
    pub missed: usize,
    /// Whether the batch was cut short by cancellation.
    pub cancelled: bool,
}
