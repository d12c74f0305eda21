//! Cooperative execution of one conversation turn.
//!
//! A turn is a sequence of steps (LLM calls, tool executions) produced by a
//! [`TurnSteps`] source. Cancellation is only observed at the checkpoint that
//! follows each completed step; a step in flight is never interrupted.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{ConversationId, ConversationStatus, RunError, StatusEmitter, StopFlagRegistry};

/// Source of the steps that make up one conversation turn.
#[async_trait]
pub trait TurnSteps: Send {
    type Output: Send;

    /// Run the next step to completion.
    ///
    /// `Ok(None)` means the turn has finished.
    async fn next_step(&mut self) -> anyhow::Result<Option<Self::Output>>;
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome<T> {
    /// Every step ran.
    Completed(Vec<T>),
    /// A stop request was honored; holds the outputs of the steps that
    /// completed before the checkpoint that observed it.
    Stopped(Vec<T>),
}

impl<T> RunOutcome<T> {
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    #[must_use]
    pub fn outputs(&self) -> &[T] {
        match self {
            Self::Completed(outputs) | Self::Stopped(outputs) => outputs,
        }
    }

    #[must_use]
    pub fn into_outputs(self) -> Vec<T> {
        match self {
            Self::Completed(outputs) | Self::Stopped(outputs) => outputs,
        }
    }
}

/// Drives [`TurnSteps`] while honoring stop requests from the registry.
#[derive(Debug, Clone)]
pub struct ConversationRunner {
    registry: Arc<StopFlagRegistry>,
    emitter: StatusEmitter,
}

impl ConversationRunner {
    #[must_use]
    pub const fn new(registry: Arc<StopFlagRegistry>, emitter: StatusEmitter) -> Self {
        Self { registry, emitter }
    }

    /// Run a turn for `conversation_id` until it finishes, fails, or is stopped.
    ///
    /// Status transitions: `running` on start and again after every step,
    /// `to_stop` when a checkpoint consumes a stop request, `clear` on normal
    /// completion, `error` on failure.
    pub async fn run<S>(
        &self,
        conversation_id: &ConversationId,
        mut steps: S,
    ) -> Result<RunOutcome<S::Output>, RunError>
    where
        S: TurnSteps,
    {
        info!(conversation_id = %conversation_id, "Starting conversation run");
        self.emitter
            .emit(conversation_id, ConversationStatus::Running);

        let mut outputs = Vec::new();
        loop {
            let step = outputs.len() + 1;
            match steps.next_step().await {
                Ok(Some(output)) => {
                    outputs.push(output);
                    if self.checkpoint(conversation_id) {
                        info!(
                            conversation_id = %conversation_id,
                            "Run stopped by request after step {step}"
                        );
                        self.emitter
                            .emit(conversation_id, ConversationStatus::ToStop);
                        return Ok(RunOutcome::Stopped(outputs));
                    }
                    // re-sync subscribers that joined mid-run
                    self.emitter
                        .emit(conversation_id, ConversationStatus::Running);
                }
                Ok(None) => break,
                Err(source) => {
                    warn!(
                        conversation_id = %conversation_id,
                        "Run failed at step {step}: {source:#}"
                    );
                    self.emitter.emit_error(conversation_id, &source);
                    return Err(RunError::OperationFailure {
                        conversation_id: conversation_id.clone(),
                        step,
                        source,
                    });
                }
            }
        }

        debug!(
            conversation_id = %conversation_id,
            "Run completed after {} steps", outputs.len()
        );
        self.emitter
            .emit(conversation_id, ConversationStatus::Clear);
        // a stop that arrived after the last checkpoint has nothing left to stop
        self.registry.clear(conversation_id);

        Ok(RunOutcome::Completed(outputs))
    }

    fn checkpoint(&self, conversation_id: &ConversationId) -> bool {
        self.registry.check_and_clear(conversation_id)
    }
}
