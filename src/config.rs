//! Configuration Module
//!
//! Handles cache sizing from environment variables and computes the
//! process-wide cache root directory.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Default maximum number of entries held in memory.
pub const DEFAULT_CAPACITY: usize = 128;

/// Default memory-tier TTL in seconds.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the memory tier can hold
    pub capacity: usize,
    /// Maximum age of a memory-tier entry before a read treats it as stale
    pub ttl: Duration,
    /// Directory holding the per-key disk records
    pub root: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `GZCLI_CACHE_CAPACITY` - Maximum memory-tier entries (default: 128)
    /// - `GZCLI_CACHE_TTL_SECS` - Memory-tier TTL in seconds (default: 3600)
    ///
    /// The cache root is always `<working-directory>/.gzcli/cache`, resolved
    /// once per process (see [`cache_root`]).
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("GZCLI_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
            ttl: Duration::from_secs(
                env::var("GZCLI_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TTL_SECS),
            ),
            root: cache_root().to_path_buf(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            root: cache_root().to_path_buf(),
        }
    }
}

/// Returns the process-wide cache root: `<working-directory>/.gzcli/cache`.
///
/// Resolved from the working directory on first call and immutable for the
/// rest of the process; there is no teardown. If the working directory cannot
/// be read, the path is rooted at `.` so record paths stay relative.
pub fn cache_root() -> &'static Path {
    static ROOT: OnceLock<PathBuf> = OnceLock::new();
    ROOT.get_or_init(|| {
        env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".gzcli")
            .join("cache")
    })
}
