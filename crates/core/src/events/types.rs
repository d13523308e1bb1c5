//! Event types emitted while acquiring a batch.

use std::fmt;

use serde::Serialize;

use crate::catalog::Track;
use crate::matcher::QualityTier;
use crate::slskd::FileListing;

/// Outcomes emitted while acquiring a batch.
///
/// Every track ends in exactly one `Acquired` or `Missed`, in submission
/// order; `TierExhausted` marks each tier that was tried and yielded
/// nothing before that.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AcquisitionEvent {
    /// A file was chosen and handed to the transfer queue.
    Acquired {
        track: Track,
        username: String,
        file: FileListing,
        tier: QualityTier,
        score: u8,
    },
    /// A tier produced no accepted candidate; the next tier will be tried.
    TierExhausted {
        track: Track,
        tier: QualityTier,
        reason: TierMissReason,
    },
    /// The track ended without an acquisition for this run.
    Missed { track: Track, reason: MissReason },
}

/// Why a single tier yielded nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TierMissReason {
    /// No peer responded to the search.
    NoOffers,
    /// Peers responded but nothing passed the tier filter.
    NoCandidates,
    /// The daemon reported the search as failed.
    SearchUnsuccessful,
    /// The daemon forgot the search session.
    SessionExpired,
    /// The search did not reach a terminal state within the wait bound.
    TimedOut,
    /// Transport failure while polling or fetching results.
    Transport { message: String },
}

impl fmt::Display for TierMissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierMissReason::NoOffers => write!(f, "no peer responded"),
            TierMissReason::NoCandidates => write!(f, "no listing passed the filter"),
            TierMissReason::SearchUnsuccessful => write!(f, "search failed on the daemon"),
            TierMissReason::SessionExpired => write!(f, "search session expired"),
            TierMissReason::TimedOut => write!(f, "search timed out"),
            TierMissReason::Transport { message } => write!(f, "transport failure: {}", message),
        }
    }
}

/// Why a track ended without an acquisition.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissReason {
    /// Every tier was tried and none matched.
    TiersExhausted,
    /// The track has no usable title/artists to search with.
    InvalidTrack { message: String },
    /// The search could not be started.
    SearchFailed { message: String },
    /// A candidate was chosen but the transfer enqueue was rejected.
    EnqueueFailed { message: String },
    /// The batch was cancelled while this track was in flight.
    Cancelled,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::TiersExhausted => write!(f, "all tiers exhausted"),
            MissReason::InvalidTrack { message } => write!(f, "invalid track: {}", message),
            MissReason::SearchFailed { message } => write!(f, "search failed: {}", message),
            MissReason::EnqueueFailed { message } => write!(f, "enqueue failed: {}", message),
            MissReason::Cancelled => write!(f, "cancelled"),
        }
    }
}
