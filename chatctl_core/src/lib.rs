#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Conversation execution control plane.
//!
//! A process-wide [`StopFlagRegistry`] lets a request handler ask a running
//! conversation turn to stop, while the [`ConversationRunner`] polls the same
//! registry at its checkpoints and reports lifecycle transitions through a
//! [`StatusEmitter`].

mod control;
mod error;
mod id;
mod registry;
mod runner;
mod status;

pub use control::ConversationControl;
pub use error::RunError;
pub use id::ConversationId;
pub use registry::{StopFlagRegistry, StopFlagStore};
pub use runner::{ConversationRunner, RunOutcome, TurnSteps};
pub use status::{
    BroadcastPublisher, ConversationStatus, STATUS_EVENT, StatusEmitter, StatusEvent,
    StatusPublisher,
};
