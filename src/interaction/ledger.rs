//! Bounded record of events the bot has already acted on.
//!
//! Deliveries are at-least-once, so the same event can arrive more than once.
//! The ledger remembers event keys until it grows past its threshold, at
//! which point a compaction throws everything away at once. Forgetting is
//! harmless here: the worst outcome is a duplicate reply.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::base::types::EventKey;

/// Default size above which a compaction resets the ledger.
pub const DEFAULT_THRESHOLD: usize = 1000;

/// Dedup ledger shared by every concurrent dispatch.
///
/// Cloning yields another handle onto the same set.
#[derive(Debug, Clone)]
pub struct DedupLedger {
    seen: Arc<Mutex<HashSet<EventKey>>>,
    threshold: usize,
}

impl Default for DedupLedger {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl DedupLedger {
    pub fn new(threshold: usize) -> Self {
        Self {
            seen: Arc::new(Mutex::new(HashSet::new())),
            threshold,
        }
    }

    /// Whether `key` has been marked since the last reset.
    pub fn seen(&self, key: &EventKey) -> bool {
        self.lock().contains(key)
    }

    /// Record `key` as seen. Marking twice is a no-op.
    pub fn mark(&self, key: EventKey) {
        self.lock().insert(key);
    }

    /// Reset the ledger if it has grown past the threshold.
    ///
    /// The reset happens under the lock, so no caller observes a partially
    /// cleared ledger. Returns whether a reset took place.
    pub fn compact(&self) -> bool {
        let mut seen = self.lock();

        if seen.len() > self.threshold {
            *seen = HashSet::new();
            return true;
        }

        false
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    // A panic while holding the lock cannot leave a `HashSet` half-updated
    // in a way that matters to us, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashSet<EventKey>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
