//! Disk Tier Module
//!
//! Durable one-file-per-key store under the cache root, written with a
//! temp-file-then-rename protocol so a reader can never observe a partially
//! written record, with or without concurrent writers or crashes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};

use crate::cache::TEMP_PREFIX;
use crate::error::{CacheError, Result};

/// Retry bound for the remove-then-rename sequence on platforms without
/// atomic replace-on-rename.
#[cfg(not(unix))]
const MAX_RENAME_ATTEMPTS: u32 = 10;

/// Backoff step between rename attempts; attempt n sleeps n times this.
#[cfg(not(unix))]
const RENAME_BACKOFF_STEP: std::time::Duration = std::time::Duration::from_millis(50);

// == Disk Tier ==
/// Crash-safe store of one payload per key. A record is valid until
/// explicitly overwritten or deleted; no TTL applies here — staleness policy
/// belongs entirely to the memory tier.
#[derive(Debug, Clone)]
pub struct DiskTier {
    /// Directory holding the per-key record files
    root: PathBuf,
}

impl DiskTier {
    // == Constructor ==
    /// Creates a tier rooted at `root`. The directory is created lazily on
    /// first write, not here.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the record path for a key. Key namespacing (and keeping keys
    /// to plain identifier names) is the caller's responsibility.
    fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    // == Write ==
    /// Durably replaces the record for `key` with `payload`.
    ///
    /// Protocol, in order: ensure the root exists; write the full payload to
    /// a fresh temp file inside the root (same volume as the target); flush
    /// and close it; atomically rename it onto the target. Failing before the
    /// rename cleans the temp file up best-effort and leaves any prior record
    /// untouched.
    pub fn write(&self, key: &str, payload: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| CacheError::access("create cache root", key, e))?;

        // The temp file is removed on drop, which covers every early return
        // below until ownership passes to replace_record.
        let mut temp = Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.root)
            .map_err(|e| CacheError::access("create temp file", key, e))?;
        temp.write_all(payload)
            .map_err(|e| CacheError::access("write temp file", key, e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| CacheError::access("flush temp file", key, e))?;

        replace_record(temp.into_temp_path(), &self.record_path(key), key)
    }

    // == Read ==
    /// Returns the full record for `key`. Absence is `NotFound`; any other
    /// failure is an access error.
    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        match fs::read(self.record_path(key)) {
            Ok(payload) => Ok(payload),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CacheError::NotFound(key.to_string()))
            }
            Err(e) => Err(CacheError::access("read record", key, e)),
        }
    }

    // == Delete ==
    /// Removes the record for `key`. Absence is `NotFound`; any other
    /// failure is an access error.
    pub fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CacheError::NotFound(key.to_string()))
            }
            Err(e) => Err(CacheError::access("delete record", key, e)),
        }
    }
}

// == Rename Commit ==
/// Renames the written temp file onto the target path. On Unix, rename
/// replaces the destination atomically, so a single attempt suffices and any
/// failure surfaces immediately.
#[cfg(unix)]
fn replace_record(temp: TempPath, target: &Path, key: &str) -> Result<()> {
    temp.persist(target)
        .map_err(|e| CacheError::access("rename temp file", key, e.error))
}

/// Without atomic replace-on-rename, best-effort remove the destination
/// (absence is fine) and then rename, retrying with increasing backoff to
/// absorb transient "file in use" conditions.
#[cfg(not(unix))]
fn replace_record(temp: TempPath, target: &Path, key: &str) -> Result<()> {
    use tracing::debug;

    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match fs::remove_file(target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            // A reader may still hold the destination open; the rename
            // below reports the condition if it persists.
            Err(e) => debug!(key, attempt, error = %e, "could not remove destination"),
        }
        match fs::rename(&temp, target) {
            Ok(()) => {
                // The file now lives at the target path; disarm the temp
                // path's delete-on-drop.
                let _ = temp.keep();
                return Ok(());
            }
            Err(e) if attempt >= MAX_RENAME_ATTEMPTS => {
                return Err(CacheError::RetryExhausted {
                    key: key.to_string(),
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                debug!(key, attempt, error = %e, "rename failed, backing off");
                std::thread::sleep(RENAME_BACKOFF_STEP * attempt);
            }
        }
    }
}
