//! Cache Entry Module
//!
//! Defines the structure for individual memory-tier entries.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single memory-tier entry: a raw serialized payload plus the moment it
/// was inserted. Entries are owned exclusively by the memory tier's
/// index/order structures.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The key this entry is indexed under
    pub key: String,
    /// The serializer's byte encoding of the cached value
    pub payload: Vec<u8>,
    /// When the payload was inserted or last overwritten
    pub inserted_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry timestamped now.
    pub fn new(key: String, payload: Vec<u8>) -> Self {
        Self {
            key,
            payload,
            inserted_at: Instant::now(),
        }
    }

    // == Refresh ==
    /// Replaces the payload and resets the insertion timestamp, as happens
    /// when a key is overwritten in place.
    pub fn refresh(&mut self, payload: Vec<u8>) {
        self.payload = payload;
        self.inserted_at = Instant::now();
    }

    // == Is Expired ==
    /// Checks whether the entry is stale under the given TTL.
    ///
    /// An entry is stale once strictly more than `ttl` has elapsed since
    /// insertion, so a TTL of zero makes every entry stale on the very next
    /// read.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}
