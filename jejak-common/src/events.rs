//! Event types and broadcast bus for the jejak event system
//!
//! Every lifecycle step of an upload session emits an event here. The UI
//! service forwards these to connected browsers over SSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Jejak event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JejakEvent {
    /// New upload session created
    SessionCreated {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A receipt file was attached to a session
    FileSelected {
        session_id: Uuid,
        file_name: String,
        timestamp: DateTime<Utc>,
    },

    /// Session moved from one workflow state to another
    SessionStateChanged {
        session_id: Uuid,
        old_state: String,
        new_state: String,
        timestamp: DateTime<Utc>,
    },

    /// Product detection finished successfully
    RecognitionCompleted {
        session_id: Uuid,
        product_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Product detection call failed
    RecognitionFailed {
        session_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Emission calculation finished successfully
    CalculationCompleted {
        session_id: Uuid,
        total_kg: f64,
        timestamp: DateTime<Utc>,
    },

    /// Emission calculation call failed
    CalculationFailed {
        session_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Computed result was stored by the backend
    EmissionRecordSaved {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Backend refused or failed to store the computed result.
    /// The displayed result is kept; saving may be retried manually.
    EmissionRecordSaveFailed {
        session_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl JejakEvent {
    /// Event type name used as the SSE event field
    pub fn event_type(&self) -> &'static str {
        match self {
            JejakEvent::SessionCreated { .. } => "SessionCreated",
            JejakEvent::FileSelected { .. } => "FileSelected",
            JejakEvent::SessionStateChanged { .. } => "SessionStateChanged",
            JejakEvent::RecognitionCompleted { .. } => "RecognitionCompleted",
            JejakEvent::RecognitionFailed { .. } => "RecognitionFailed",
            JejakEvent::CalculationCompleted { .. } => "CalculationCompleted",
            JejakEvent::CalculationFailed { .. } => "CalculationFailed",
            JejakEvent::EmissionRecordSaved { .. } => "EmissionRecordSaved",
            JejakEvent::EmissionRecordSaveFailed { .. } => "EmissionRecordSaveFailed",
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            JejakEvent::SessionCreated { session_id, .. }
            | JejakEvent::FileSelected { session_id, .. }
            | JejakEvent::SessionStateChanged { session_id, .. }
            | JejakEvent::RecognitionCompleted { session_id, .. }
            | JejakEvent::RecognitionFailed { session_id, .. }
            | JejakEvent::CalculationCompleted { session_id, .. }
            | JejakEvent::CalculationFailed { session_id, .. }
            | JejakEvent::EmissionRecordSaved { session_id, .. }
            | JejakEvent::EmissionRecordSaveFailed { session_id, .. } => *session_id,
        }
    }
}

/// Broadcast event bus shared by all handlers
///
/// Thin wrapper over `tokio::sync::broadcast`. Subscribers receive events
/// emitted after they subscribe; slow subscribers lose the oldest events
/// once the channel capacity is exceeded.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JejakEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<JejakEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscriber is currently listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: JejakEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<JejakEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the case where nobody is listening
    pub fn emit_lossy(&self, event: JejakEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("event emitted with no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> JejakEvent {
        JejakEvent::SessionCreated {
            session_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let event = sample_event();
        let expected = event.session_id();
        bus.emit(event).expect("one subscriber");

        let received = rx.recv().await.expect("event delivered");
        assert_eq!(received.session_id(), expected);
        assert_eq!(received.event_type(), "SessionCreated");
    }

    #[test]
    fn emit_without_subscribers_fails() {
        let bus = EventBus::new(16);
        assert!(bus.emit(sample_event()).is_err());
    }

    #[test]
    fn emit_lossy_without_subscribers_is_silent() {
        let bus = EventBus::new(16);
        bus.emit_lossy(sample_event());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(json["type"], "SessionCreated");
    }
}
