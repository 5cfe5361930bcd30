//! Cache Module
//!
//! The two-tier cache engine: a bounded LRU+TTL memory tier, a crash-safe
//! disk tier, a per-key write coordinator, and the facade composing them.

mod disk;
mod entry;
mod locks;
mod memory;
mod store;


// Re-export public types
pub use disk::DiskTier;
pub use entry::CacheEntry;
pub use locks::WriteCoordinator;
pub use memory::MemoryTier;
pub use store::TieredCache;

// == Public Constants ==
/// Prefix of in-flight temp files inside the cache root. A record is never
/// visible under its final name until the rename completes, so anything
/// carrying this prefix is incomplete and safe to ignore.
pub const TEMP_PREFIX: &str = ".gzcache-tmp-";
