//! End-to-end cancellation of a running conversation turn.

use async_trait::async_trait;
use chatctl_core::{
    BroadcastPublisher, ConversationControl, ConversationId, ConversationStatus, RunOutcome,
    StatusEmitter, StopFlagRegistry, TurnSteps,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{mpsc, oneshot};

fn control() -> (ConversationControl, BroadcastPublisher) {
    let publisher = BroadcastPublisher::new(64);
    let control = ConversationControl::new(
        Arc::new(StopFlagRegistry::new()),
        StatusEmitter::new(Arc::new(publisher.clone())),
    );
    (control, publisher)
}

/// Five-step turn whose third step hands control to the test before running.
struct GatedTurn {
    total: usize,
    executed: Arc<AtomicUsize>,
    gate_at: usize,
    started: mpsc::Sender<usize>,
    release: Option<oneshot::Receiver<()>>,
}

#[async_trait]
impl TurnSteps for GatedTurn {
    type Output = String;

    async fn next_step(&mut self) -> anyhow::Result<Option<String>> {
        let step = self.executed.load(Ordering::SeqCst) + 1;
        if step > self.total {
            return Ok(None);
        }
        if step == self.gate_at {
            self.started.send(step).await?;
            if let Some(release) = self.release.take() {
                release.await?;
            }
        }
        self.executed.fetch_add(1, Ordering::SeqCst);
        Ok(Some(format!("step {step}")))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_issued_after_step_two_halts_after_step_three() {
    let (control, publisher) = control();
    let mut statuses = publisher.subscribe();
    let id = ConversationId::from("abc-1");
    let executed = Arc::new(AtomicUsize::new(0));
    let (started_tx, mut started_rx) = mpsc::channel(1);
    let (release_tx, release_rx) = oneshot::channel();

    let turn = GatedTurn {
        total: 5,
        executed: executed.clone(),
        gate_at: 3,
        started: started_tx,
        release: Some(release_rx),
    };

    let runner = control.runner();
    let run_id = id.clone();
    let run = tokio::spawn(async move { runner.run(&run_id, turn).await });

    // step 3 has begun, so the checkpoint after step 2 has already passed
    assert_eq!(started_rx.recv().await, Some(3));
    control.registry().set(&id);
    release_tx.send(()).ok();

    let outcome = run.await.unwrap().unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Stopped(vec![
            "step 1".to_string(),
            "step 2".to_string(),
            "step 3".to_string(),
        ])
    );
    assert_eq!(executed.load(Ordering::SeqCst), 3);

    let mut seen = Vec::new();
    while let Ok((_, event)) = statuses.try_recv() {
        assert_eq!(event.conversation_id, id);
        seen.push(event.status);
    }
    assert_eq!(
        seen,
        vec![
            ConversationStatus::Running,
            ConversationStatus::Running,
            ConversationStatus::Running,
            ConversationStatus::ToStop,
        ]
    );
}

#[tokio::test]
async fn stop_requested_before_run_is_honored_at_first_checkpoint() {
    let (control, _) = control();
    let id = ConversationId::from("early");
    let executed = Arc::new(AtomicUsize::new(0));
    let (started_tx, _started_rx) = mpsc::channel(1);

    control.request_stop(&id);

    let turn = GatedTurn {
        total: 5,
        executed: executed.clone(),
        gate_at: usize::MAX,
        started: started_tx,
        release: None,
    };
    let outcome = control.runner().run(&id, turn).await.unwrap();

    assert!(outcome.is_stopped());
    assert_eq!(executed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reset_before_new_turn_discards_stale_stop() {
    let (control, _) = control();
    let id = ConversationId::from("stale");
    let executed = Arc::new(AtomicUsize::new(0));
    let (started_tx, _started_rx) = mpsc::channel(1);

    control.request_stop(&id);
    control.reset(&id);

    let turn = GatedTurn {
        total: 4,
        executed: executed.clone(),
        gate_at: usize::MAX,
        started: started_tx,
        release: None,
    };
    let outcome = control.runner().run(&id, turn).await.unwrap();

    assert!(!outcome.is_stopped());
    assert_eq!(executed.load(Ordering::SeqCst), 4);
}
