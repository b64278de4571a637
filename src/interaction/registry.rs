//! Threads the bot keeps listening in.
//!
//! A thread becomes active the first time the bot replies in it and stays
//! active for the life of the process. There is no eviction, so the registry
//! grows with every thread the bot has ever joined.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::base::types::ThreadKey;

/// Registry of active threads, shared by every concurrent dispatch.
#[derive(Debug, Clone, Default)]
pub struct ThreadRegistry {
    active: Arc<Mutex<HashSet<ThreadKey>>>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, key: &ThreadKey) -> bool {
        self.lock().contains(key)
    }

    /// Mark a thread active. Never undone.
    pub fn activate(&self, key: ThreadKey) {
        self.lock().insert(key);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<ThreadKey>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
