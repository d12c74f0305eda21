//! Process-wide stop-flag registry.
//!
//! A pending stop request is encoded by key presence alone: an id in the store
//! means "stop requested", absence means "nothing pending or already consumed".
//! Every operation goes through one mutex guarding the whole store and never
//! calls out of the registry while the lock is held.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::ConversationId;

/// Backing storage for pending stop requests.
///
/// Implementations are plain synchronous containers; serialization is the
/// registry's job, not the store's.
pub trait StopFlagStore: Send {
    /// Mark `id` as pending. Inserting twice keeps a single entry.
    fn insert(&mut self, id: ConversationId);

    /// Remove `id`, returning whether it was present.
    fn remove(&mut self, id: &ConversationId) -> bool;

    fn contains(&self, id: &ConversationId) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StopFlagStore for HashSet<ConversationId> {
    fn insert(&mut self, id: ConversationId) {
        HashSet::insert(self, id);
    }

    fn remove(&mut self, id: &ConversationId) -> bool {
        HashSet::remove(self, id)
    }

    fn contains(&self, id: &ConversationId) -> bool {
        HashSet::contains(self, id)
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }
}

/// Shared map from conversation to "stop requested".
///
/// Construct one per process and hand it out behind an `Arc`.
pub struct StopFlagRegistry {
    flags: Mutex<Box<dyn StopFlagStore>>,
}

impl StopFlagRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(HashSet::new())
    }

    /// Create a registry over a custom store.
    #[must_use]
    pub fn with_store<S>(store: S) -> Self
    where
        S: StopFlagStore + 'static,
    {
        Self {
            flags: Mutex::new(Box::new(store)),
        }
    }

    /// Request that the run for `id` stop at its next checkpoint.
    ///
    /// Idempotent: repeated calls collapse into one pending flag.
    pub fn set(&self, id: &ConversationId) {
        self.lock().insert(id.clone());
        debug!(conversation_id = %id, "stop flag set");
    }

    /// Consume a pending stop request for `id`.
    ///
    /// Returns `true` at most once per pending flag, however many callers race.
    pub fn check_and_clear(&self, id: &ConversationId) -> bool {
        let consumed = self.lock().remove(id);
        if consumed {
            debug!(conversation_id = %id, "stop flag consumed");
        }
        consumed
    }

    /// Discard any pending stop request for `id` without consuming it.
    pub fn clear(&self, id: &ConversationId) {
        if self.lock().remove(id) {
            debug!(conversation_id = %id, "stale stop flag discarded");
        }
    }

    /// Non-consuming read, for status probes only.
    #[must_use]
    pub fn is_pending(&self, id: &ConversationId) -> bool {
        self.lock().contains(id)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    // Store operations are single inserts/removes, so a panic elsewhere cannot
    // leave the map half-updated; recover the guard instead of propagating.
    fn lock(&self) -> MutexGuard<'_, Box<dyn StopFlagStore>> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StopFlagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StopFlagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopFlagRegistry")
            .field("pending", &self.pending_count())
            .finish()
    }
}
