//! Acquisition engine implementation.
//!
//! Tracks are processed strictly one at a time: the shared resource is the
//! slskd daemon's search slots and rate limit, and serializing keeps a
//! single local daemon from being overwhelmed. Within a track, tiers are
//! tried in priority order; a later tier is never tried once an earlier
//! one has produced an accepted candidate.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::catalog::Track;
use crate::events::{AcquisitionEvent, EventHandle, MissReason, TierMissReason};
use crate::ledger::DownloadLedger;
use crate::matcher::{score_offers, select_best, Candidate, QualityTier};
use crate::slskd::{SearchState, SlskdError, SoulseekClient};

use super::config::EngineConfig;
use super::types::{AcquireReport, CancellationToken};

/// Outcome of one tier attempt.
enum TierResult {
    /// Best-of-tier candidate accepted; the engine dispatches it.
    Found(Candidate),
    /// Nothing acceptable this tier; fall through to the next.
    Exhausted(TierMissReason),
}

/// A condition that ends the whole track, not just the current tier.
enum TrackFailure {
    SearchStart(SlskdError),
    Cancelled,
}

/// Result of waiting on a search session.
enum SearchWait {
    Completed,
    Exhausted(TierMissReason),
}

enum TrackOutcome {
    Acquired,
    Missed,
}

/// The acquisition engine: tier loop, search-and-poll cycle, candidate
/// selection, transfer dispatch, and outcome reporting.
pub struct AcquisitionEngine {
    config: EngineConfig,
    client: Arc<dyn SoulseekClient>,
    ledger: Arc<dyn DownloadLedger>,
    events: EventHandle,
}

impl AcquisitionEngine {
    /// Create a new engine.
    pub fn new(
        config: EngineConfig,
        client: Arc<dyn SoulseekClient>,
        ledger: Arc<dyn DownloadLedger>,
        events: EventHandle,
    ) -> Self {
        Self {
            config,
            client,
            ledger,
            events,
        }
    }

    /// Acquire a batch of tracks, one at a time, in order.
    ///
    /// The caller is expected to have filtered already-acquired tracks
    /// against the ledger; ids are not re-checked here. Every started
    /// track ends in exactly one Acquired or Missed event, in submission
    /// order; no error aborts the batch.
    pub async fn acquire(&self, tracks: &[Track], cancel: &CancellationToken) -> AcquireReport {
        let mut report = AcquireReport::default();

        for track in tracks {
            if cancel.is_cancelled() {
                break;
            }
            match self.acquire_track(track, cancel).await {
                TrackOutcome::Acquired => report.acquired += 1,
                TrackOutcome::Missed => report.missed += 1,
            }
        }

        report.cancelled = cancel.is_cancelled();
        report
    }

    /// Run the tier loop for one track.
    async fn acquire_track(&self, track: &Track, cancel: &CancellationToken) -> TrackOutcome {
        let Some(match_string) = track.match_string() else {
            warn!(track_id = %track.id, "track has no usable title/artists");
            return self
                .miss(
                    track,
                    MissReason::InvalidTrack {
                        message: "empty match string".to_string(),
                    },
                )
                .await;
        };

        info!(track_id = %track.id, query = %match_string, "acquiring track");

        for tier in &self.config.tiers {
            if cancel.is_cancelled() {
                return self.miss(track, MissReason::Cancelled).await;
            }

            match self.run_tier(&match_string, tier, cancel).await {
                Ok(TierResult::Found(best)) => {
                    return self.dispatch(track, tier, best).await;
                }
                Ok(TierResult::Exhausted(reason)) => {
                    debug!(
                        track_id = %track.id,
                        extension = %tier.extension,
                        min_bitrate = tier.min_bitrate,
                        reason = %reason,
                        "tier exhausted"
                    );
                    self.events
                        .emit(AcquisitionEvent::TierExhausted {
                            track: track.clone(),
                            tier: tier.clone(),
                            reason,
                        })
                        .await;
                }
                Err(TrackFailure::Cancelled) => {
                    return self.miss(track, MissReason::Cancelled).await;
                }
                Err(TrackFailure::SearchStart(e)) => {
                    warn!(track_id = %track.id, error = %e, "search could not be started");
                    return self
                        .miss(
                            track,
                            MissReason::SearchFailed {
                                message: e.to_string(),
                            },
                        )
                        .await;
                }
            }
        }

        self.miss(track, MissReason::TiersExhausted).await
    }

    /// Enqueue the chosen candidate and record the acquisition.
    async fn dispatch(&self, track: &Track, tier: &QualityTier, best: Candidate) -> TrackOutcome {
        debug!(
            track_id = %track.id,
            username = %best.username,
            filename = %best.file.filename,
            score = best.score,
            "dispatching transfer"
        );

        if let Err(e) = self.client.enqueue_download(&best.username, &best.file).await {
            warn!(track_id = %track.id, error = %e, "transfer enqueue rejected");
            return self
                .miss(
                    track,
                    MissReason::EnqueueFailed {
                        message: e.to_string(),
                    },
                )
                .await;
        }

        if let Err(e) = self.ledger.record(track) {
            // The transfer is already queued; losing the record means a
            // re-download on a later pass, not a miss.
            error!(track_id = %track.id, error = %e, "failed to record download");
        }

        info!(track_id = %track.id, filename = %best.file.filename, "track acquired");
        self.events
            .emit(AcquisitionEvent::Acquired {
                track: track.clone(),
                username: best.username,
                file: best.file,
                tier: tier.clone(),
                score: best.score,
            })
            .await;

        TrackOutcome::Acquired
    }

    /// Run one tier: search, wait, score, select.
    async fn run_tier(
        &self,
        match_string: &str,
        tier: &QualityTier,
        cancel: &CancellationToken,
    ) -> Result<TierResult, TrackFailure> {
        let search_id = self
            .client
            .start_search(match_string)
            .await
            .map_err(TrackFailure::SearchStart)?;

        match self.await_search(&search_id, cancel).await? {
            SearchWait::Completed => {}
            SearchWait::Exhausted(reason) => return Ok(TierResult::Exhausted(reason)),
        }

        let offers = match self.client.search_responses(&search_id).await {
            Ok(offers) => offers,
            Err(SlskdError::NotFound(_)) => {
                return Ok(TierResult::Exhausted(TierMissReason::SessionExpired));
            }
            Err(e) => {
                return Ok(TierResult::Exhausted(TierMissReason::Transport {
                    message: e.to_string(),
                }));
            }
        };

        if offers.is_empty() {
            return Ok(TierResult::Exhausted(TierMissReason::NoOffers));
        }

        let candidates = score_offers(&offers, match_string, tier);
        match select_best(candidates) {
            Some(best) => Ok(TierResult::Found(best)),
            None => Ok(TierResult::Exhausted(TierMissReason::NoCandidates)),
        }
    }

    /// Poll until the search is terminal, the timeout expires, or the
    /// batch is cancelled.
    async fn await_search(
        &self,
        search_id: &str,
        cancel: &CancellationToken,
    ) -> Result<SearchWait, TrackFailure> {
        let deadline = Instant::now() + Duration::from_secs(self.config.search_timeout_secs);

        loop {
            if cancel.is_cancelled() {
                return Err(TrackFailure::Cancelled);
            }

            match self.client.search_state(search_id).await {
                Ok(SearchState::Completed) => return Ok(SearchWait::Completed),
                Ok(SearchState::Failed) => {
                    return Ok(SearchWait::Exhausted(TierMissReason::SearchUnsuccessful));
                }
                Ok(SearchState::Pending) | Ok(SearchState::InProgress) => {}
                Err(SlskdError::NotFound(_)) => {
                    return Ok(SearchWait::Exhausted(TierMissReason::SessionExpired));
                }
                Err(e) => {
                    return Ok(SearchWait::Exhausted(TierMissReason::Transport {
                        message: e.to_string(),
                    }));
                }
            }

            if Instant::now() >= deadline {
                debug!(search_id = search_id, "search wait deadline passed");
                return Ok(SearchWait::Exhausted(TierMissReason::TimedOut));
            }

            tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
        }
    }

    async fn miss(&self, track: &Track, reason: MissReason) -> TrackOutcome {
        info!(track_id = %track.id, reason = %reason, "track missed");
        self.events
            .emit(AcquisitionEvent::Missed {
                track: track.clone(),
                reason,
            })
            .await;
        TrackOutcome::Missed
    }
}
