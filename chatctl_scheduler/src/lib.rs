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

//! Periodic background maintenance.
//!
//! One long-lived task sleeps for a fixed interval, acquires a scoped session,
//! runs a maintenance job inside it and releases the session. A failing run is
//! logged and the loop carries on.

mod error;
mod job;
mod scheduler;

pub use error::JobError;
pub use job::{MaintenanceJob, SessionProvider};
pub use scheduler::{PeriodicScheduler, SchedulerConfig, SchedulerHandle, SchedulerStats};
