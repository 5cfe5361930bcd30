//! Tiered Cache Module
//!
//! The public Get/Set/Delete surface: a read-through, write-through facade
//! over the memory tier, the disk tier, and the write coordinator.

use std::path::PathBuf;
use std::sync::PoisonError;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{DiskTier, MemoryTier, WriteCoordinator};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Tiered Cache ==
/// Two-tier key-value cache: a bounded LRU+TTL memory tier in front of a
/// crash-safe disk tier. Values pass through serde_json on the way in and
/// out; key namespacing to avoid collisions is the caller's responsibility.
///
/// Writes to the same key are totally ordered by the per-key write lock.
/// Reads are never ordered against concurrent writes; a caller needing
/// "read sees latest write" must issue the `get` after its `set` returned.
#[derive(Debug)]
pub struct TieredCache {
    memory: MemoryTier,
    disk: DiskTier,
    writers: WriteCoordinator,
}

impl TieredCache {
    // == Constructors ==
    /// Creates a cache from configuration, rooted at the process-wide
    /// cache directory.
    pub fn new(config: &Config) -> Self {
        Self::with_root(config.root.clone(), config.capacity, config.ttl)
    }

    /// Creates a cache over an explicit root directory. Useful for tests or
    /// when a specific cache location is needed.
    pub fn with_root(root: PathBuf, capacity: usize, ttl: Duration) -> Self {
        Self {
            memory: MemoryTier::new(capacity, ttl),
            disk: DiskTier::new(root),
            writers: WriteCoordinator::new(),
        }
    }

    // == Set ==
    /// Serializes `value` once and writes the payload through both tiers:
    /// memory first, then the disk protocol under the key's write lock.
    ///
    /// A concurrent reader may observe the new value in memory before it is
    /// durable on disk; likewise a failed disk write leaves the memory tier
    /// already updated. Both are accepted relaxations — a failed `set` never
    /// leaves a partially written disk record, which is the guarantee that
    /// matters.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_vec(value).map_err(|e| CacheError::Encoding {
            key: key.to_string(),
            op: "serialize",
            source: e,
        })?;

        self.memory.put(key, payload.clone());

        let lock = self.writers.lock_for(key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.disk.write(key, &payload)
    }

    // == Get ==
    /// Reads `key` through the tiers: memory first, then disk, promoting a
    /// disk hit back into memory so the next access avoids I/O.
    ///
    /// A memory hit that fails to deserialize evicts the corrupt entry and
    /// falls through to disk instead of failing. Disk absence is
    /// [`CacheError::NotFound`]; any other disk failure surfaces distinctly.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        if let Some(payload) = self.memory.get(key) {
            match serde_json::from_slice(&payload) {
                Ok(value) => {
                    debug!(key, "memory hit");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(key, error = %e, "corrupt memory entry, falling back to disk");
                    self.memory.remove(key);
                }
            }
        }

        let payload = self.disk.read(key)?;
        let value = serde_json::from_slice(&payload).map_err(|e| CacheError::Encoding {
            key: key.to_string(),
            op: "deserialize",
            source: e,
        })?;

        debug!(key, "disk hit, promoting into memory");
        self.memory.put(key, payload);
        Ok(value)
    }

    // == Delete ==
    /// Removes `key` from both tiers. The memory removal never errors; the
    /// disk removal reports [`CacheError::NotFound`] when no record exists.
    ///
    /// Not atomic across tiers: a concurrent `get` racing the two removals
    /// may see a stale memory hit after the disk record is gone, or vice
    /// versa.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.memory.remove(key);
        self.disk.delete(key)
    }

    /// The memory tier, for callers inspecting what is currently hot.
    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }
}
