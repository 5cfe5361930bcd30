//! gzcache - Two-tier key-value cache for the gzcli command-line tool
//!
//! Memoizes expensive externally-fetched or derived data (API results,
//! computed configuration) across and within process invocations: a bounded
//! LRU+TTL memory tier in front of a durable, crash-safe disk tier, with
//! per-key write serialization.
//!
//! # Example
//! ```no_run
//! use gzcache::{Config, TieredCache};
//!
//! let cache = TieredCache::new(&Config::from_env());
//! cache.set("scoreboard", &vec![("alpha", 42)])?;
//! let board: Vec<(String, i64)> = cache.get("scoreboard")?;
//! # Ok::<(), gzcache::CacheError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{DiskTier, MemoryTier, TieredCache, WriteCoordinator};
pub use config::Config;
pub use error::{CacheError, Result};
