//! Notifications emitted by the core.
//!
//! Front ends turn these into toasts, haptic cues or log lines. The core never
//! calls presentation code directly; it only emits events through an
//! [`EventSink`].

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{CatchId, OperationKind};
use crate::state::SyncState;

/// Something a user-facing client may want to react to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    CatchSaved {
        id: CatchId,
        species: String,
    },
    CatchUpdated {
        id: CatchId,
    },
    CatchDeleted {
        id: CatchId,
    },
    /// A catch was saved without a weight; ask the user to enter it manually
    WeightMissing {
        id: CatchId,
        species: String,
    },
    VoiceListening,
    VoiceTranscript {
        text: String,
    },
    VoiceCancelled,
    SyncStarted,
    SyncFinished {
        synced: usize,
        failed: usize,
        state: SyncState,
    },
    OperationSynced {
        operation_id: i64,
        record_id: CatchId,
        kind: OperationKind,
    },
    OperationFailed {
        operation_id: i64,
        record_id: CatchId,
        kind: OperationKind,
        error: String,
    },
    ConnectivityChanged {
        online: bool,
    },
}

/// Receiver of core notifications
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LedgerEvent);
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: LedgerEvent) {}
}

impl<F> EventSink for F
where
    F: Fn(LedgerEvent) + Send + Sync,
{
    fn emit(&self, event: LedgerEvent) {
        self(event);
    }
}

/// Fan events out to any number of async subscribers
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<LedgerEvent>,
}

impl BroadcastSink {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: LedgerEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closures_are_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let sink = move |event: LedgerEvent| captured.lock().unwrap().push(event);

        sink.emit(LedgerEvent::VoiceListening);
        sink.emit(LedgerEvent::ConnectivityChanged { online: true });

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                LedgerEvent::VoiceListening,
                LedgerEvent::ConnectivityChanged { online: true }
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn broadcast_delivers_to_subscribers() {
        let sink = BroadcastSink::default();
        let mut receiver = sink.subscribe();

        sink.emit(LedgerEvent::SyncStarted);
        assert_eq!(receiver.recv().await.unwrap(), LedgerEvent::SyncStarted);
    }

    #[test]
    fn broadcast_without_subscribers_does_not_fail() {
        BroadcastSink::new(0).emit(LedgerEvent::VoiceCancelled);
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(LedgerEvent::ConnectivityChanged { online: false }).unwrap();
        assert_eq!(json["event"], "connectivity_changed");
        assert_eq!(json["online"], false);
    }
}
