//! Database entities for persisted conversation state.

pub mod sessions;
