//! Integration Tests for the Tiered Cache
//!
//! Exercises the public get/set/delete surface against a real cache root,
//! including crash safety, concurrent writers, and the two-tier read path.

use std::fs;
use std::sync::{Arc, Once};
use std::thread;
use std::time::Duration;

use gzcache::cache::TEMP_PREFIX;
use gzcache::{CacheError, TieredCache};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

const HOUR: Duration = Duration::from_secs(3600);

// == Helper Functions ==

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "gzcache=debug".into()),
            )
            .try_init();
    });
}

fn create_test_cache(capacity: usize, ttl: Duration) -> (TieredCache, TempDir) {
    init_tracing();
    let dir = TempDir::new().expect("failed to create temp directory");
    let cache = TieredCache::with_root(dir.path().to_path_buf(), capacity, ttl);
    (cache, dir)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ApiResult {
    endpoint: String,
    body: String,
}

// == Round Trip ==

#[test]
fn test_roundtrip_structured_value() {
    let (cache, _dir) = create_test_cache(8, HOUR);
    let result = ApiResult {
        endpoint: "/api/teams".to_string(),
        body: "[{\"id\":1}]".to_string(),
    };

    cache.set("teams_response", &result).unwrap();

    let got: ApiResult = cache.get("teams_response").unwrap();
    assert_eq!(got, result);
}

// == Worked Example ==
// capacity=2, ttl=1h: Set a,b,c leaves memory holding {b,c}; Get a misses
// memory, hits disk, returns 1, and promotes a while evicting b.

#[test]
fn test_worked_example_capacity_two() {
    let (cache, _dir) = create_test_cache(2, HOUR);

    cache.set("a", &1u32).unwrap();
    cache.set("b", &2u32).unwrap();
    cache.set("c", &3u32).unwrap();

    assert!(!cache.memory().contains("a"));
    assert!(cache.memory().contains("b"));
    assert!(cache.memory().contains("c"));

    let got: u32 = cache.get("a").unwrap();
    assert_eq!(got, 1);

    assert!(cache.memory().contains("c"));
    assert!(cache.memory().contains("a"));
    assert!(!cache.memory().contains("b"));

    // b was only evicted from memory; disk still serves it.
    let got: u32 = cache.get("b").unwrap();
    assert_eq!(got, 2);
}

// == TTL Expiry ==

#[test]
fn test_ttl_expiry_falls_back_to_disk_and_repromotes() {
    let (cache, _dir) = create_test_cache(8, Duration::from_millis(20));

    cache.set("key1", &"fresh".to_string()).unwrap();
    thread::sleep(Duration::from_millis(50));

    // Past the TTL the memory tier misses, but disk has no TTL.
    let got: String = cache.get("key1").unwrap();
    assert_eq!(got, "fresh");

    // The read re-promoted the payload, so it is hot again.
    assert!(cache.memory().contains("key1"));
}

// == Delete Semantics ==

#[test]
fn test_delete_semantics() {
    let (cache, _dir) = create_test_cache(8, HOUR);

    let err = cache.delete("absent").unwrap_err();
    assert!(err.is_not_found());

    cache.set("key1", &"v".to_string()).unwrap();
    cache.delete("key1").unwrap();

    let result: Result<String, _> = cache.get("key1");
    assert!(matches!(result, Err(CacheError::NotFound(_))));
}

// == Crash Safety ==

#[test]
fn test_interrupted_write_never_corrupts_reads() {
    let (cache, dir) = create_test_cache(8, HOUR);

    cache.set("config", &"pre-write value".to_string()).unwrap();

    // Simulate a writer that died after producing its temp file but before
    // the rename: an orphan with the temp prefix sits in the cache root.
    fs::write(
        dir.path().join(format!("{TEMP_PREFIX}abandoned")),
        b"{\"half\":",
    )
    .unwrap();

    // A fresh instance (cold memory) must still read the pre-write value.
    let cold = TieredCache::with_root(dir.path().to_path_buf(), 8, HOUR);
    let got: String = cold.get("config").unwrap();
    assert_eq!(got, "pre-write value");
}

#[test]
fn test_interrupted_first_write_reads_not_found() {
    let (cache, dir) = create_test_cache(8, HOUR);

    // No completed write ever happened for this key; only an orphan temp.
    fs::write(
        dir.path().join(format!("{TEMP_PREFIX}orphan")),
        b"partial",
    )
    .unwrap();

    let result: Result<String, _> = cache.get("never_written");
    assert!(matches!(result, Err(CacheError::NotFound(_))));
}

// == Concurrent Writers ==

#[test]
fn test_concurrent_same_key_writers_leave_one_complete_value() {
    let (cache, dir) = create_test_cache(8, HOUR);
    let cache = Arc::new(cache);

    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.set("shared", &i).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // The record on disk must be exactly one writer's value, never a mix.
    let raw = fs::read(dir.path().join("shared")).unwrap();
    let value: u32 = serde_json::from_slice(&raw).expect("record must be one complete encoding");
    assert!(value < 8);
}

#[test]
fn test_concurrent_distinct_keys_do_not_interfere() {
    let (cache, _dir) = create_test_cache(16, HOUR);
    let cache = Arc::new(cache);

    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let key = format!("key{i}");
                cache.set(&key, &i).unwrap();
                let got: u32 = cache.get(&key).unwrap();
                assert_eq!(got, i);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..8u32 {
        let got: u32 = cache.get(&format!("key{i}")).unwrap();
        assert_eq!(got, i);
    }
}

// == Eviction Order ==

#[test]
fn test_eviction_order_with_read_protection() {
    let (cache, _dir) = create_test_cache(3, HOUR);

    cache.set("k1", &1u32).unwrap();
    cache.set("k2", &2u32).unwrap();
    cache.set("k3", &3u32).unwrap();

    // Reading k1 before the fourth insert protects it; k2 is evicted instead.
    let _: u32 = cache.get("k1").unwrap();
    cache.set("k4", &4u32).unwrap();

    assert!(cache.memory().contains("k1"));
    assert!(!cache.memory().contains("k2"));

    // Evicted from memory only: the value itself survives on disk.
    let got: u32 = cache.get("k2").unwrap();
    assert_eq!(got, 2);
}

// == Cross-Invocation Persistence ==

#[test]
fn test_values_survive_process_restart() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    {
        let cache = TieredCache::with_root(dir.path().to_path_buf(), 4, HOUR);
        cache
            .set(
                "challenge_list",
                &vec!["pwn1".to_string(), "web2".to_string()],
            )
            .unwrap();
    }

    let cache = TieredCache::with_root(dir.path().to_path_buf(), 4, HOUR);
    let got: Vec<String> = cache.get("challenge_list").unwrap();
    assert_eq!(got, vec!["pwn1".to_string(), "web2".to_string()]);
}
