//! Ingest event bus
//!
//! Broadcasts the outcome of every pipeline invocation to in-process
//! subscribers (diagnostics, tests). Not a user notification channel:
//! nobody is told about a failed watcher file beyond the log line and this
//! in-process event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Which intake channel supplied a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeChannel {
    /// Interactive HTTP upload
    Upload,
    /// File deposited in the watched directory tree
    Watcher,
}

/// Ingest event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IngestEvent {
    /// Raw and cleaned artifacts were both written
    IngestCompleted {
        channel: IntakeChannel,
        filename: String,
        source_label: String,
        raw_artifact_id: Uuid,
        cleaned_artifact_id: Uuid,
        row_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Pipeline invocation failed
    IngestFailed {
        channel: IntakeChannel,
        filename: String,
        source_label: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl IngestEvent {
    /// Filename the event refers to
    pub fn filename(&self) -> &str {
        match self {
            IngestEvent::IngestCompleted { filename, .. } => filename,
            IngestEvent::IngestFailed { filename, .. } => filename,
        }
    }
}

/// Broadcast bus for ingest events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<IngestEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<IngestEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: IngestEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_emitted_event() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        bus.emit_lossy(IngestEvent::IngestFailed {
            channel: IntakeChannel::Watcher,
            filename: "members.csv".to_string(),
            source_label: "Local12".to_string(),
            error: "Malformed input".to_string(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.filename(), "members.csv");
    }

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let bus = EventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit_lossy(IngestEvent::IngestFailed {
            channel: IntakeChannel::Upload,
            filename: "a.csv".to_string(),
            source_label: "x".to_string(),
            error: "boom".to_string(),
            timestamp: Utc::now(),
        });
        assert_eq!(bus.capacity(), 4);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = IngestEvent::IngestCompleted {
            channel: IntakeChannel::Upload,
            filename: "members.xlsx".to_string(),
            source_label: "Local12".to_string(),
            raw_artifact_id: Uuid::new_v4(),
            cleaned_artifact_id: Uuid::new_v4(),
            row_count: 3,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "IngestCompleted");
        assert_eq!(json["channel"], "upload");
        assert_eq!(json["row_count"], 3);
    }
}
