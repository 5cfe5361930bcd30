//! Write Coordinator Module
//!
//! Per-key mutual exclusion for disk writes, so the multi-step write
//! protocol is never interleaved for the same key (one writer's rename
//! racing another's remove).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

// == Write Coordinator ==
/// Registry mapping each key to its own lock. Locks are created lazily on
/// first use and retained for the process lifetime; the key space is small
/// and bounded (configuration and identifier names), so the growth is an
/// accepted tradeoff.
///
/// A writer for key `k` must hold `k`'s lock across the entire disk write
/// protocol. Readers and deletes do not take it.
#[derive(Debug, Default)]
pub struct WriteCoordinator {
    registry: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WriteCoordinator {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `key`, creating it on first use. The
    /// registry-wide lock is held only for this lookup, never across I/O.
    pub fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut registry = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(registry.entry(key.to_string()).or_default())
    }

    /// Number of keys with a registered lock.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
