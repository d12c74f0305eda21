use thiserror::Error;

use crate::ConversationId;

/// Failure of a conversation run.
///
/// A user-requested stop is not an error; it surfaces as
/// [`RunOutcome::Stopped`](crate::RunOutcome::Stopped).
#[derive(Debug, Error)]
pub enum RunError {
    #[error("conversation {conversation_id} failed at step {step}: {source}")]
    OperationFailure {
        conversation_id: ConversationId,
        step: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl RunError {
    #[must_use]
    pub const fn conversation_id(&self) -> &ConversationId {
        match self {
            Self::OperationFailure {
                conversation_id, ..
            } => conversation_id,
        }
    }
}
