use std::sync::Arc;
use tracing::info;

use crate::{
    ConversationId, ConversationRunner, ConversationStatus, StatusEmitter, StopFlagRegistry,
};

/// Entry point for request handlers.
///
/// Bundles the process-wide registry with the status emitter so handlers can
/// request stops, reset stale requests and probe status without touching the
/// registry's internals.
#[derive(Debug, Clone)]
pub struct ConversationControl {
    registry: Arc<StopFlagRegistry>,
    emitter: StatusEmitter,
}

impl ConversationControl {
    #[must_use]
    pub const fn new(registry: Arc<StopFlagRegistry>, emitter: StatusEmitter) -> Self {
        Self { registry, emitter }
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<StopFlagRegistry> {
        &self.registry
    }

    #[must_use]
    pub const fn emitter(&self) -> &StatusEmitter {
        &self.emitter
    }

    /// Runner sharing this control plane's registry and emitter.
    #[must_use]
    pub fn runner(&self) -> ConversationRunner {
        ConversationRunner::new(Arc::clone(&self.registry), self.emitter.clone())
    }

    /// Ask the run for `conversation_id` to stop and acknowledge it right away.
    ///
    /// Harmless when no run is active: the flag waits for the next run's
    /// first checkpoint or an explicit [`reset`](Self::reset).
    pub fn request_stop(&self, conversation_id: &ConversationId) {
        info!(conversation_id = %conversation_id, "Stop requested");
        self.registry.set(conversation_id);
        self.emitter
            .emit(conversation_id, ConversationStatus::ToStop);
    }

    /// Drop a stale stop request before a new turn starts.
    pub fn reset(&self, conversation_id: &ConversationId) {
        self.registry.clear(conversation_id);
    }

    /// Best-effort status query; emits and returns what it found.
    pub fn probe(&self, conversation_id: &ConversationId) -> ConversationStatus {
        let status = if self.registry.is_pending(conversation_id) {
            ConversationStatus::ToStop
        } else {
            ConversationStatus::Clear
        };
        self.emitter.emit(conversation_id, status);
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BroadcastPublisher;

    fn control() -> (ConversationControl, BroadcastPublisher) {
        let publisher = BroadcastPublisher::new(16);
        let control = ConversationControl::new(
            Arc::new(StopFlagRegistry::new()),
            StatusEmitter::new(Arc::new(publisher.clone())),
        );
        (control, publisher)
    }

    #[tokio::test]
    async fn request_stop_sets_flag_and_acknowledges() {
        let (control, publisher) = control();
        let mut rx = publisher.subscribe();
        let id = ConversationId::from("c");

        control.request_stop(&id);

        assert!(control.registry().is_pending(&id));
        let (_, event) = rx.recv().await.unwrap();
        assert_eq!(event.status, ConversationStatus::ToStop);
        assert_eq!(event.conversation_id, id);
    }

    #[test]
    fn reset_discards_pending_stop() {
        let (control, _) = control();
        let id = ConversationId::from("c");
        control.request_stop(&id);

        control.reset(&id);

        assert!(!control.registry().check_and_clear(&id));
    }

    #[test]
    fn probe_reports_without_consuming() {
        let (control, _) = control();
        let id = ConversationId::from("c");

        assert_eq!(control.probe(&id), ConversationStatus::Clear);
        control.request_stop(&id);
        assert_eq!(control.probe(&id), ConversationStatus::ToStop);
        assert!(control.registry().check_and_clear(&id));
    }
}
