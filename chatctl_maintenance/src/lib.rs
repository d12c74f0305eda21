#![warn(
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

//! Database-backed maintenance for the periodic scheduler.
//!
//! [`DatabaseSessionProvider`] scopes each scheduled run to one transaction and
//! [`SessionRetentionJob`] prunes idle conversation sessions inside it.

mod database;
mod retention;

pub use database::{DatabaseSessionProvider, ensure_schema};
pub use retention::SessionRetentionJob;
