//! Memory Tier Module
//!
//! Bounded LRU cache of raw payloads with lazy TTL expiry. The recency list
//! is an arena of slots addressed by stable integer handles with intrusive
//! prev/next links, plus a key-to-handle index; this keeps every operation
//! O(1) amortized without aliased mutable references.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::cache::CacheEntry;

/// Sentinel handle meaning "no slot".
const NIL: usize = usize::MAX;

// == Arena Slot ==
/// One arena cell: an entry plus its intrusive recency links.
/// Released slots keep their cell (with cleared entry) and are recycled
/// through the free list, so handles held in the index stay stable.
#[derive(Debug)]
struct Slot {
    entry: CacheEntry,
    prev: usize,
    next: usize,
}

// == Tier State ==
/// Index, order, and size, all mutated together under one lock.
///
/// Invariants: `index.len()` equals the number of live slots and never
/// exceeds `capacity`; walking `next` links from `head` visits entries in
/// non-increasing recency, ending at `tail`.
#[derive(Debug)]
struct Inner {
    capacity: usize,
    ttl: Duration,
    slots: Vec<Slot>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: usize,
    tail: usize,
}

impl Inner {
    fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
        }
    }

    /// Looks up a payload, expiring it lazily if older than the TTL and
    /// promoting it to most-recently-used otherwise.
    fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let handle = *self.index.get(key)?;
        if self.slots[handle].entry.is_expired(self.ttl) {
            debug!(key, "memory entry expired, evicting");
            self.release(handle);
            return None;
        }
        self.move_to_front(handle);
        Some(self.slots[handle].entry.payload.clone())
    }

    /// Inserts or overwrites a payload at the front, evicting from the back
    /// while over capacity. With capacity 0 the fresh insert is itself the
    /// back, so every put immediately evicts.
    fn put(&mut self, key: &str, payload: Vec<u8>) {
        if let Some(&handle) = self.index.get(key) {
            self.slots[handle].entry.refresh(payload);
            self.move_to_front(handle);
            return;
        }

        let entry = CacheEntry::new(key.to_string(), payload);
        let handle = match self.free.pop() {
            Some(handle) => {
                self.slots[handle].entry = entry;
                handle
            }
            None => {
                self.slots.push(Slot {
                    entry,
                    prev: NIL,
                    next: NIL,
                });
                self.slots.len() - 1
            }
        };
        self.index.insert(key.to_string(), handle);
        self.push_front(handle);

        while self.index.len() > self.capacity {
            let victim = self.tail;
            debug!(key = %self.slots[victim].entry.key, "evicting least-recently-used entry");
            self.release(victim);
        }
    }

    /// Removes a key if present; no-op otherwise.
    fn remove(&mut self, key: &str) {
        if let Some(&handle) = self.index.get(key) {
            self.release(handle);
        }
    }

    /// Unlinks a slot, drops its index entry, and recycles the cell.
    fn release(&mut self, handle: usize) {
        self.unlink(handle);
        let key = std::mem::take(&mut self.slots[handle].entry.key);
        self.slots[handle].entry.payload = Vec::new();
        self.index.remove(&key);
        self.free.push(handle);
    }

    fn unlink(&mut self, handle: usize) {
        let prev = self.slots[handle].prev;
        let next = self.slots[handle].next;
        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.slots[handle].prev = NIL;
        self.slots[handle].next = NIL;
    }

    fn push_front(&mut self, handle: usize) {
        self.slots[handle].prev = NIL;
        self.slots[handle].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = handle;
        } else {
            self.tail = handle;
        }
        self.head = handle;
    }

    fn move_to_front(&mut self, handle: usize) {
        if self.head == handle {
            return;
        }
        self.unlink(handle);
        self.push_front(handle);
    }
}

// == Memory Tier ==
/// Bounded LRU+TTL cache of hot payloads. Never performs I/O and never
/// errors; all three operations run under one lock covering index, order,
/// and size together.
#[derive(Debug)]
pub struct MemoryTier {
    inner: Mutex<Inner>,
}

impl MemoryTier {
    // == Constructor ==
    /// Creates an empty tier holding at most `capacity` entries, each stale
    /// once older than `ttl`.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::new(capacity, ttl)),
        }
    }

    /// Poisoning only means another thread panicked mid-operation; the
    /// per-operation invariants still hold, so continue with the inner data.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Get ==
    /// Returns the payload for `key`, or None on absence or staleness.
    /// A hit marks the entry most recently used.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key)
    }

    // == Put ==
    /// Inserts or overwrites `key` at the front of the recency order.
    pub fn put(&self, key: &str, payload: Vec<u8>) {
        self.lock().put(key, payload);
    }

    // == Remove ==
    /// Deletes `key` if present; no-op otherwise.
    pub fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    // == Length ==
    /// Returns the current number of live entries.
    pub fn len(&self) -> usize {
        self.lock().index.len()
    }

    /// Returns true if the tier holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Contains ==
    /// Reports raw membership without touching recency or expiring entries.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().index.contains_key(key)
    }
}
