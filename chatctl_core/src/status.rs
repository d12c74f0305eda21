//! Conversation lifecycle status broadcast.
//!
//! Statuses are transient values pushed to subscribers, never stored. The wire
//! payload always carries an `error` field; with no error it holds the literal
//! placeholder `"None"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::ConversationId;

/// Event name under which status payloads are published.
pub const STATUS_EVENT: &str = "status";

const NO_ERROR: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// A run is actively executing.
    Running,
    /// Nothing pending.
    Clear,
    /// A stop was requested and is being honored.
    ToStop,
    /// The run terminated abnormally.
    Error,
}

impl ConversationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Clear => "clear",
            Self::ToStop => "to_stop",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of one status broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub conversation_id: ConversationId,
    pub status: ConversationStatus,
    pub error: String,
}

impl StatusEvent {
    #[must_use]
    pub fn new(conversation_id: ConversationId, status: ConversationStatus) -> Self {
        Self {
            conversation_id,
            status,
            error: NO_ERROR.to_string(),
        }
    }

    /// An `error` status carrying the display form of `error`.
    #[must_use]
    pub fn failed(conversation_id: ConversationId, error: &dyn fmt::Display) -> Self {
        Self {
            conversation_id,
            status: ConversationStatus::Error,
            error: error.to_string(),
        }
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error != NO_ERROR
    }
}

/// Publish/subscribe primitive the emitter pushes into.
///
/// Delivery is fire-and-forget; an `Err` is logged by the emitter and dropped.
pub trait StatusPublisher: Send + Sync {
    fn publish(&self, event: &str, payload: &StatusEvent) -> anyhow::Result<()>;
}

/// Reports lifecycle transitions for conversations.
///
/// Emission never fails from the caller's point of view.
#[derive(Clone)]
pub struct StatusEmitter {
    publisher: Arc<dyn StatusPublisher>,
}

impl StatusEmitter {
    #[must_use]
    pub const fn new(publisher: Arc<dyn StatusPublisher>) -> Self {
        Self { publisher }
    }

    pub fn emit(&self, conversation_id: &ConversationId, status: ConversationStatus) {
        self.send(&StatusEvent::new(conversation_id.clone(), status));
    }

    pub fn emit_error(&self, conversation_id: &ConversationId, error: &dyn fmt::Display) {
        self.send(&StatusEvent::failed(conversation_id.clone(), error));
    }

    fn send(&self, event: &StatusEvent) {
        if let Err(e) = self.publisher.publish(STATUS_EVENT, event) {
            warn!(
                conversation_id = %event.conversation_id,
                status = %event.status,
                "Failed to publish status: {e:#}"
            );
        }
    }
}

impl fmt::Debug for StatusEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusEmitter").finish_non_exhaustive()
    }
}

/// In-process fan-out of status events over a tokio broadcast channel.
///
/// Subscribers receive every conversation's events and filter on
/// `conversation_id` themselves. Slow subscribers lag rather than block.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<(String, StatusEvent)>,
}

impl BroadcastPublisher {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<(String, StatusEvent)> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl StatusPublisher for BroadcastPublisher {
    fn publish(&self, event: &str, payload: &StatusEvent) -> anyhow::Result<()> {
        if self
            .sender
            .send((event.to_string(), payload.clone()))
            .is_err()
        {
            debug!(
                conversation_id = %payload.conversation_id,
                "No status subscribers, dropping {}", payload.status
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct FailingPublisher;

    impl StatusPublisher for FailingPublisher {
        fn publish(&self, _event: &str, _payload: &StatusEvent) -> anyhow::Result<()> {
            anyhow::bail!("socket closed")
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<(String, StatusEvent)>>,
    }

    impl StatusPublisher for RecordingPublisher {
        fn publish(&self, event: &str, payload: &StatusEvent) -> anyhow::Result<()> {
            if let Ok(mut events) = self.events.lock() {
                events.push((event.to_string(), payload.clone()));
            }
            Ok(())
        }
    }

    #[test]
    fn running_payload_uses_none_placeholder() {
        let event = StatusEvent::new("abc-1".into(), ConversationStatus::Running);
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value,
            json!({"conversation_id": "abc-1", "status": "running", "error": "None"})
        );
        assert!(!event.has_error());
    }

    #[test]
    fn status_labels_match_wire_format() {
        for status in [
            ConversationStatus::Running,
            ConversationStatus::Clear,
            ConversationStatus::ToStop,
            ConversationStatus::Error,
        ] {
            let value = serde_json::to_value(status).unwrap();
            assert_eq!(value, json!(status.as_str()));
        }
        assert_eq!(ConversationStatus::ToStop.to_string(), "to_stop");
    }

    #[test]
    fn error_payload_carries_message() {
        let err = anyhow::anyhow!("warehouse unreachable");
        let event = StatusEvent::failed("abc-1".into(), &err);

        assert_eq!(event.status, ConversationStatus::Error);
        assert_eq!(event.error, "warehouse unreachable");
        assert!(event.has_error());
    }

    #[test]
    fn emitter_publishes_under_status_event_name() {
        let recorder = Arc::new(RecordingPublisher::default());
        let emitter = StatusEmitter::new(recorder.clone());

        emitter.emit(&"c".into(), ConversationStatus::Clear);

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, STATUS_EVENT);
        assert_eq!(events[0].1.status, ConversationStatus::Clear);
    }

    #[test]
    fn emitter_swallows_publish_failures() {
        let emitter = StatusEmitter::new(Arc::new(FailingPublisher));
        emitter.emit(&"c".into(), ConversationStatus::Running);
        emitter.emit_error(&"c".into(), &"boom");
    }

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let publisher = BroadcastPublisher::new(8);
        let mut first = publisher.subscribe();
        let mut second = publisher.subscribe();
        let emitter = StatusEmitter::new(Arc::new(publisher.clone()));

        emitter.emit(&"c".into(), ConversationStatus::ToStop);

        let (name, event) = first.recv().await.unwrap();
        assert_eq!(name, STATUS_EVENT);
        assert_eq!(event.status, ConversationStatus::ToStop);
        assert_eq!(second.recv().await.unwrap().1, event);
    }

    #[test]
    fn broadcast_without_subscribers_is_not_an_error() {
        let publisher = BroadcastPublisher::new(8);
        let event = StatusEvent::new("c".into(), ConversationStatus::Running);

        assert!(publisher.publish(STATUS_EVENT, &event).is_ok());
        assert_eq!(publisher.subscriber_count(), 0);
    }
}
