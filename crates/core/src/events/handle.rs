use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::AcquisitionEvent;

/// Envelope wrapping an event with its emission time.
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: AcquisitionEvent,
}

/// Handle for emitting acquisition events.
///
/// Cheaply cloneable. Events travel through an async channel to whatever
/// sink the caller attached (a log printer, a collector in tests).
#[derive(Clone)]
pub struct EventHandle {
    tx: mpsc::Sender<EventEnvelope>,
}

impl EventHandle {
    /// Create a handle from a channel sender.
    pub fn new(tx: mpsc::Sender<EventEnvelope>) -> Self {
        Self { tx }
    }

    /// Create a handle together with its receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EventEnvelope>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Emit an event.
    ///
    /// A closed channel is logged, never propagated: a broken sink must
    /// not fail an acquisition.
    pub async fn emit(&self, event: AcquisitionEvent) {
        let envelope = EventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        if let Err(e) = self.tx.send(envelope).await {
            tracing::error!("failed to emit acquisition event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Track;
    use crate::events::MissReason;

    fn missed_event() -> AcquisitionEvent {
        AcquisitionEvent::Missed {
            track: Track::new("t1", "Low", vec!["Flo Rida".to_string()]),
            reason: MissReason::TiersExhausted,
        }
    }

    #[tokio::test]
    async fn test_emit_event() {
        let (handle, mut rx) = EventHandle::channel(10);

        handle.emit(missed_event()).await;

        let envelope = rx.recv().await.expect("should receive event");
        assert!(matches!(envelope.event, AcquisitionEvent::Missed { .. }));
    }

    #[tokio::test]
    async fn test_multiple_handles_same_channel() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle1 = EventHandle::new(tx.clone());
        let handle2 = EventHandle::new(tx);

        handle1.emit(missed_event()).await;
        handle2.emit(missed_event()).await;

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_emit_closed_channel_does_not_panic() {
        let (handle, rx) = EventHandle::channel(10);
        drop(rx);

        // Logs an error, nothing more
        handle.emit(missed_event()).await;
    }

    #[tokio::test]
    async fn test_envelope_has_timestamp() {
        let (handle, mut rx) = EventHandle::channel(10);

        let before = Utc::now();
        handle.emit(missed_event()).await;
        let after = Utc::now();

        let envelope = rx.recv().await.unwrap();
        assert!(envelope.timestamp >= before);
        assert!(envelope.timestamp <= after);
    }
}
