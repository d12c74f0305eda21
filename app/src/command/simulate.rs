//! Scripted conversation turn for exercising stop requests end to end.
//!
//! Every status payload is printed to stdout as `<event> <json>`, one per line.

use async_trait::async_trait;
use chatctl_config::Config;
use chatctl_core::{ConversationId, RunOutcome, TurnSteps};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{CommandStrategy, build_control};

/// Input for the simulate command.
#[derive(Debug, Clone)]
pub struct SimulateInput {
    pub conversation: Option<String>,
    pub steps: usize,
    pub step_ms: u64,
    pub stop_after_ms: Option<u64>,
    pub fail_at: Option<usize>,
}

/// Fixed-length turn whose steps just take time.
struct ScriptedTurn {
    total: usize,
    done: usize,
    step_duration: Duration,
    fail_at: Option<usize>,
}

#[async_trait]
impl TurnSteps for ScriptedTurn {
    type Output = String;

    async fn next_step(&mut self) -> anyhow::Result<Option<String>> {
        if self.done == self.total {
            return Ok(None);
        }
        let step = self.done + 1;
        debug!("Executing step {step}/{}", self.total);
        sleep(self.step_duration).await;
        if self.fail_at == Some(step) {
            anyhow::bail!("scripted failure at step {step}");
        }
        self.done = step;
        Ok(Some(format!("step {step}/{}", self.total)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimulateStrategy;

impl CommandStrategy for SimulateStrategy {
    type Input = SimulateInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default()?;
        let (control, publisher) = build_control(&config);

        let conversation_id = input
            .conversation
            .map_or_else(ConversationId::generate, ConversationId::from);

        let mut events = publisher.subscribe();
        drop(publisher);
        let printer = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok((name, event)) => match serde_json::to_string(&event) {
                        Ok(json) => println!("{name} {json}"),
                        Err(e) => warn!("Failed to encode status event: {e}"),
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Status printer lagged, skipped {skipped} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        // a new turn never inherits a stop aimed at an earlier one
        control.reset(&conversation_id);

        let stopper = input.stop_after_ms.map(|ms| {
            let control = control.clone();
            let conversation_id = conversation_id.clone();
            tokio::spawn(async move {
                sleep(Duration::from_millis(ms)).await;
                control.request_stop(&conversation_id);
            })
        });

        let turn = ScriptedTurn {
            total: input.steps,
            done: 0,
            step_duration: Duration::from_millis(input.step_ms),
            fail_at: input.fail_at,
        };
        let result = control.runner().run(&conversation_id, turn).await;

        if let Some(stopper) = stopper {
            stopper.abort();
            let _ = stopper.await;
        }
        // last sender gone: the printer drains what is buffered and exits
        drop(control);
        printer.await?;

        match result? {
            RunOutcome::Completed(outputs) => {
                info!("Conversation {conversation_id} completed {} steps", outputs.len());
            }
            RunOutcome::Stopped(outputs) => {
                info!(
                    "Conversation {conversation_id} stopped after {} of {} steps",
                    outputs.len(),
                    input.steps
                );
            }
        }
        Ok(())
    }
}
