//! End-to-end acquisition scenarios driven against the testing mocks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use soulfetch_core::engine::{AcquireReport, AcquisitionEngine, CancellationToken, EngineConfig};
use soulfetch_core::events::{
    AcquisitionEvent, EventEnvelope, EventHandle, MissReason, TierMissReason,
};
use soulfetch_core::ledger::DownloadLedger;
use soulfetch_core::slskd::{SearchState, SlskdError, SoulseekClient};
use soulfetch_core::testing::{fixtures, MemoryLedger, MockSoulseek};

struct Harness {
    client: Arc<MockSoulseek>,
    ledger: Arc<MemoryLedger>,
    engine: AcquisitionEngine,
    rx: mpsc::Receiver<EventEnvelope>,
}

fn harness(config: EngineConfig) -> Harness {
    let client = Arc::new(MockSoulseek::new());
    let ledger = Arc::new(MemoryLedger::new());
    let (events, rx) = EventHandle::channel(256);
    let engine = AcquisitionEngine::new(
        config,
        Arc::clone(&client) as Arc<dyn SoulseekClient>,
        Arc::clone(&ledger) as Arc<dyn DownloadLedger>,
        events,
    );
    Harness {
        client,
        ledger,
        engine,
        rx,
    }
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        poll_interval_secs: 0,
        search_timeout_secs: 5,
        tiers: vec![
            fixtures::tier("mp3", 320),
            fixtures::tier("flac", 0),
            fixtures::tier("mp3", 0),
        ],
    }
}

fn drain(rx: &mut mpsc::Receiver<EventEnvelope>) -> Vec<AcquisitionEvent> {
    let mut events = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        events.push(envelope.event);
    }
    events
}

fn terminal_count(events: &[AcquisitionEvent]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                AcquisitionEvent::Acquired { .. } | AcquisitionEvent::Missed { .. }
            )
        })
        .count()
}

#[tokio::test]
async fn acquires_on_first_tier_match() {
    let mut h = harness(fast_config());
    h.client
        .push_offers(vec![fixtures::offer(
            "peer",
            vec![fixtures::listing("flo-rida-low.mp3", 320)],
        )])
        .await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(
        report,
        AcquireReport {
            acquired: 1,
            missed: 0,
            cancelled: false,
        }
    );

    assert_eq!(h.client.recorded_searches().await, vec!["Low Flo Rida"]);

    let enqueues = h.client.recorded_enqueues().await;
    assert_eq!(enqueues.len(), 1);
    assert_eq!(enqueues[0].username, "peer");
    assert_eq!(enqueues[0].filename, "flo-rida-low.mp3");

    assert_eq!(h.ledger.record_count(), 1);
    assert!(h.ledger.contains("t1").unwrap());

    let events = drain(&mut h.rx);
    assert_eq!(events.len(), 1);
    assert!(
        matches!(&events[0], AcquisitionEvent::Acquired { track, score, .. }
            if track.id == "t1" && *score > 0)
    );
}

#[tokio::test]
async fn falls_through_to_permissive_tier() {
    let mut h = harness(fast_config());
    // Tier 0 and tier 1 searches see nothing; tier 2 gets an
    // unknown-bitrate mp3.
    h.client.push_offers(vec![]).await;
    h.client.push_offers(vec![]).await;
    h.client
        .push_offers(vec![fixtures::offer(
            "peer",
            vec![fixtures::listing("flo rida low.mp3", 0)],
        )])
        .await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(report.acquired, 1);
    assert_eq!(h.client.search_count().await, 3);

    let events = drain(&mut h.rx);
    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[0],
        AcquisitionEvent::TierExhausted {
            reason: TierMissReason::NoOffers,
            ..
        }
    ));
    assert!(matches!(
        &events[1],
        AcquisitionEvent::TierExhausted {
            reason: TierMissReason::NoOffers,
            ..
        }
    ));
    assert!(
        matches!(&events[2], AcquisitionEvent::Acquired { tier, .. }
            if tier.extension == "mp3" && tier.min_bitrate == 0)
    );
}

#[tokio::test]
async fn misses_when_all_tiers_empty() {
    let mut h = harness(fast_config());

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(report.missed, 1);
    assert_eq!(h.client.search_count().await, 3);
    assert_eq!(h.ledger.record_count(), 0);
    assert!(h.client.recorded_enqueues().await.is_empty());

    let events = drain(&mut h.rx);
    assert_eq!(events.len(), 4); // three tier misses, one terminal
    assert!(matches!(
        events.last().unwrap(),
        AcquisitionEvent::Missed {
            reason: MissReason::TiersExhausted,
            ..
        }
    ));
}

#[tokio::test]
async fn enqueue_failure_is_track_fatal() {
    let mut h = harness(fast_config());
    h.client
        .push_offers(vec![fixtures::offer(
            "peer",
            vec![fixtures::listing("flo-rida-low.mp3", 320)],
        )])
        .await;
    h.client
        .fail_next_enqueue(SlskdError::Transport("daemon unreachable".to_string()))
        .await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(report.missed, 1);
    // No fallthrough to the remaining tiers after a chosen candidate
    assert_eq!(h.client.search_count().await, 1);
    assert_eq!(h.ledger.record_count(), 0);

    let events = drain(&mut h.rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        AcquisitionEvent::Missed {
            reason: MissReason::EnqueueFailed { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn tier_zero_wins_when_both_tiers_would_match() {
    let mut h = harness(fast_config());
    // One search response holding a tier-0 match and a tier-1 match
    h.client
        .push_offers(vec![fixtures::offer(
            "peer",
            vec![
                fixtures::listing("low flo rida.flac", 0),
                fixtures::listing("low flo rida.mp3", 320),
            ],
        )])
        .await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    h.engine.acquire(&[track], &CancellationToken::new()).await;

    // Tier 0 satisfied by the mp3; no second search ever happens
    assert_eq!(h.client.search_count().await, 1);
    let enqueues = h.client.recorded_enqueues().await;
    assert_eq!(enqueues[0].filename, "low flo rida.mp3");
}

#[tokio::test]
async fn best_similarity_wins_within_tier() {
    let mut h = harness(fast_config());
    h.client
        .push_offers(vec![fixtures::offer(
            "peer",
            vec![
                fixtures::listing("some entirely unrelated bootleg.mp3", 320),
                fixtures::listing("low flo rida.mp3", 320),
            ],
        )])
        .await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    h.engine.acquire(&[track], &CancellationToken::new()).await;

    let enqueues = h.client.recorded_enqueues().await;
    assert_eq!(enqueues[0].filename, "low flo rida.mp3");
}

#[tokio::test]
async fn filtered_listings_fall_to_later_tier() {
    let mut h = harness(fast_config());
    let files = vec![
        fixtures::listing("low flo rida.ogg", 320),
        fixtures::listing("low flo rida.mp3", 128),
    ];
    // Tier 0 rejects both (wrong extension / low bitrate), tier 1 sees
    // nothing, tier 2 accepts the 128 kbit/s mp3.
    h.client
        .push_offers(vec![fixtures::offer("peer", files.clone())])
        .await;
    h.client.push_offers(vec![]).await;
    h.client
        .push_offers(vec![fixtures::offer("peer", files)])
        .await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(report.acquired, 1);
    let events = drain(&mut h.rx);
    assert!(matches!(
        &events[0],
        AcquisitionEvent::TierExhausted {
            reason: TierMissReason::NoCandidates,
            ..
        }
    ));
    let enqueues = h.client.recorded_enqueues().await;
    assert_eq!(enqueues[0].filename, "low flo rida.mp3");
}

#[tokio::test]
async fn stalled_search_times_out_per_tier() {
    let mut h = harness(EngineConfig {
        poll_interval_secs: 0,
        search_timeout_secs: 0,
        tiers: fast_config().tiers,
    });
    h.client.set_state(SearchState::InProgress).await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(report.missed, 1);
    assert_eq!(h.client.search_count().await, 3);

    let events = drain(&mut h.rx);
    assert_eq!(events.len(), 4);
    assert!(events.iter().take(3).all(|e| matches!(
        e,
        AcquisitionEvent::TierExhausted {
            reason: TierMissReason::TimedOut,
            ..
        }
    )));
}

#[tokio::test]
async fn expired_session_is_tier_local() {
    let mut h = harness(EngineConfig {
        tiers: vec![fixtures::tier("mp3", 320)],
        ..fast_config()
    });
    h.client
        .fail_next_state(SlskdError::NotFound("search-0".to_string()))
        .await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(report.missed, 1);
    let events = drain(&mut h.rx);
    assert!(matches!(
        &events[0],
        AcquisitionEvent::TierExhausted {
            reason: TierMissReason::SessionExpired,
            ..
        }
    ));
}

#[tokio::test]
async fn poll_transport_failure_is_tier_local() {
    let mut h = harness(fast_config());
    h.client
        .fail_next_state(SlskdError::Transport("connection reset".to_string()))
        .await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    // The failing tier is skipped; the remaining tiers still run
    assert_eq!(report.missed, 1);
    assert_eq!(h.client.search_count().await, 3);

    let events = drain(&mut h.rx);
    assert!(matches!(
        &events[0],
        AcquisitionEvent::TierExhausted {
            reason: TierMissReason::Transport { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn responses_fetch_failure_is_tier_local() {
    let mut h = harness(EngineConfig {
        tiers: vec![fixtures::tier("mp3", 320)],
        ..fast_config()
    });
    h.client
        .fail_next_responses(SlskdError::Transport("connection reset".to_string()))
        .await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(report.missed, 1);
    let events = drain(&mut h.rx);
    assert!(matches!(
        &events[0],
        AcquisitionEvent::TierExhausted {
            reason: TierMissReason::Transport { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn failed_search_start_aborts_track() {
    let mut h = harness(fast_config());
    h.client
        .fail_next_start(SlskdError::Transport("daemon down".to_string()))
        .await;

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(report.missed, 1);
    assert_eq!(h.client.search_count().await, 0);

    let events = drain(&mut h.rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        AcquisitionEvent::Missed {
            reason: MissReason::SearchFailed { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn invalid_track_fails_fast_without_network() {
    let mut h = harness(fast_config());

    let track = fixtures::track("t1", "Low", &[]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(report.missed, 1);
    assert_eq!(h.client.search_count().await, 0);

    let events = drain(&mut h.rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        AcquisitionEvent::Missed {
            reason: MissReason::InvalidTrack { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn caller_side_dedup_makes_second_run_free() {
    let mut h = harness(fast_config());
    h.client
        .push_offers(vec![fixtures::offer(
            "peer",
            vec![fixtures::listing("flo-rida-low.mp3", 320)],
        )])
        .await;

    let tracks = vec![fixtures::track("t1", "Low", &["Flo Rida"])];
    h.engine.acquire(&tracks, &CancellationToken::new()).await;
    assert_eq!(h.client.search_count().await, 1);

    // Second pass: the caller filters against the ledger first
    let downloaded = h.ledger.downloaded_ids().unwrap();
    let remaining: Vec<_> = tracks
        .iter()
        .filter(|t| !downloaded.contains(&t.id))
        .cloned()
        .collect();
    assert!(remaining.is_empty());

    h.engine.acquire(&remaining, &CancellationToken::new()).await;
    assert_eq!(h.client.search_count().await, 1); // no additional calls

    let events = drain(&mut h.rx);
    assert_eq!(terminal_count(&events), 1);
}

#[tokio::test]
async fn ledger_write_failure_keeps_acquired_outcome() {
    let mut h = harness(fast_config());
    h.client
        .push_offers(vec![fixtures::offer(
            "peer",
            vec![fixtures::listing("flo-rida-low.mp3", 320)],
        )])
        .await;
    h.ledger.fail_next_record();

    let track = fixtures::track("t1", "Low", &["Flo Rida"]);
    let report = h.engine.acquire(&[track], &CancellationToken::new()).await;

    assert_eq!(report.acquired, 1);
    assert_eq!(h.ledger.record_count(), 0);

    let events = drain(&mut h.rx);
    assert!(matches!(&events[0], AcquisitionEvent::Acquired { .. }));
}

#[tokio::test]
async fn events_follow_submission_order() {
    let mut h = harness(fast_config());
    // t1 matches on tier 0; t2 finds nothing anywhere
    h.client
        .push_offers(vec![fixtures::offer(
            "peer",
            vec![fixtures::listing("low flo rida.mp3", 320)],
        )])
        .await;

    let tracks = vec![
        fixtures::track("t1", "Low", &["Flo Rida"]),
        fixtures::track("t2", "In For The Kill", &["La Roux"]),
    ];
    let report = h.engine.acquire(&tracks, &CancellationToken::new()).await;

    assert_eq!(report.acquired, 1);
    assert_eq!(report.missed, 1);

    let events = drain(&mut h.rx);
    assert!(matches!(&events[0], AcquisitionEvent::Acquired { track, .. } if track.id == "t1"));
    assert!(
        matches!(events.last().unwrap(), AcquisitionEvent::Missed { track, .. }
            if track.id == "t2")
    );
    // Exactly one terminal event per track
    assert_eq!(terminal_count(&events), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancellation_ends_current_track_and_skips_rest() {
    let mut h = harness(EngineConfig {
        poll_interval_secs: 1,
        search_timeout_secs: 120,
        tiers: fast_config().tiers,
    });
    // First search never completes, so the engine sits in the poll loop
    h.client.set_state(SearchState::InProgress).await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let tracks = vec![
        fixtures::track("t1", "Low", &["Flo Rida"]),
        fixtures::track("t2", "In For The Kill", &["La Roux"]),
    ];
    let report = h.engine.acquire(&tracks, &cancel).await;

    assert!(report.cancelled);
    assert_eq!(report.missed, 1);
    assert_eq!(report.acquired, 0);
    // Only the first track ever searched
    assert_eq!(h.client.search_count().await, 1);

    let events = drain(&mut h.rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        AcquisitionEvent::Missed {
            reason: MissReason::Cancelled,
            track,
        } if track.id == "t1"
    ));
}
