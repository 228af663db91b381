//! Tests for the key-value service
//!
//! These tests verify:
//! - Put/get/delete through the service, backed by a real log
//! - Validation happens before anything is stored or logged
//! - State survives shutdown and bootstrap
//! - Deletes shrink the log on disk

use std::fs;
use std::sync::Arc;

use ledgerkv::{Config, KeyValueService, LedgerError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_service() -> (TempDir, KeyValueService<ledgerkv::store::MemoryStore>) {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(&temp_dir);
    let service = KeyValueService::bootstrap(&config).unwrap();
    (temp_dir, service)
}

fn config_for(temp_dir: &TempDir) -> Config {
    Config::builder()
        .log_path(temp_dir.path().join("tx.log"))
        .build()
}

// =============================================================================
// Basic Operations
// =============================================================================

#[test]
fn test_put_then_get() {
    let (_temp, service) = setup_service();

    service.put("user-1", "ada").unwrap();
    assert_eq!(service.get("user-1").unwrap(), "ada");

    service.shutdown().unwrap();
}

#[test]
fn test_put_overwrites_value() {
    let (_temp, service) = setup_service();

    service.put("k", "old").unwrap();
    service.put("k", "new").unwrap();
    assert_eq!(service.get("k").unwrap(), "new");

    service.shutdown().unwrap();
}

#[test]
fn test_get_missing_key() {
    let (_temp, service) = setup_service();

    assert!(matches!(
        service.get("missing"),
        Err(LedgerError::KeyNotFound)
    ));

    service.shutdown().unwrap();
}

#[test]
fn test_delete_then_get() {
    let (_temp, service) = setup_service();

    service.put("k", "v").unwrap();
    service.delete("k").unwrap();
    assert!(matches!(service.get("k"), Err(LedgerError::KeyNotFound)));

    service.shutdown().unwrap();
}

#[test]
fn test_delete_missing_key() {
    let (_temp, service) = setup_service();

    assert!(matches!(
        service.delete("missing"),
        Err(LedgerError::KeyNotFound)
    ));

    service.shutdown().unwrap();
}

// =============================================================================
// Validation Gate
// =============================================================================

#[test]
fn test_invalid_key_rejected_before_logging() {
    let (temp, service) = setup_service();

    assert!(matches!(
        service.put("bad key", "v"),
        Err(LedgerError::InvalidKey(_))
    ));
    service.shutdown().unwrap();

    // Nothing reached the log.
    let contents = fs::read_to_string(temp.path().join("tx.log")).unwrap();
    assert_eq!(contents, "");
}

#[test]
fn test_oversized_value_rejected_before_logging() {
    let (temp, service) = setup_service();

    let oversized = "v".repeat(129);
    assert!(matches!(
        service.put("k", &oversized),
        Err(LedgerError::InvalidValue(_))
    ));
    service.shutdown().unwrap();

    let contents = fs::read_to_string(temp.path().join("tx.log")).unwrap();
    assert_eq!(contents, "");
}

#[test]
fn test_delete_of_missing_key_not_logged() {
    let (temp, service) = setup_service();

    let _ = service.delete("never-existed");
    service.shutdown().unwrap();

    // Store-then-log order: a failed delete records nothing (and
    // triggers no compaction churn).
    let contents = fs::read_to_string(temp.path().join("tx.log")).unwrap();
    assert_eq!(contents, "");
}

#[test]
fn test_validation_applies_to_reads_too() {
    let (_temp, service) = setup_service();

    assert!(matches!(
        service.get("bad/key"),
        Err(LedgerError::InvalidKey(_))
    ));

    service.shutdown().unwrap();
}

// =============================================================================
// Restart Behavior
// =============================================================================

#[test]
fn test_state_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(&temp_dir);

    {
        let service = KeyValueService::bootstrap(&config).unwrap();
        service.put("a", "1").unwrap();
        service.put("b", "2").unwrap();
        service.put("a", "updated").unwrap();
        service.delete("b").unwrap();
        service.shutdown().unwrap();
    }

    let service = KeyValueService::bootstrap(&config).unwrap();
    assert_eq!(service.get("a").unwrap(), "updated");
    assert!(matches!(service.get("b"), Err(LedgerError::KeyNotFound)));
    service.shutdown().unwrap();
}

#[test]
fn test_two_bootstraps_agree() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(&temp_dir);

    {
        let service = KeyValueService::bootstrap(&config).unwrap();
        for i in 0..10 {
            service.put(&format!("key{}", i), &format!("v{}", i)).unwrap();
        }
        service.delete("key3").unwrap();
        service.shutdown().unwrap();
    }

    // Replaying the same log twice must land on the same state.
    for _ in 0..2 {
        let service = KeyValueService::bootstrap(&config).unwrap();
        assert_eq!(service.get("key0").unwrap(), "v0");
        assert!(matches!(service.get("key3"), Err(LedgerError::KeyNotFound)));
        assert_eq!(service.get("key9").unwrap(), "v9");
        service.shutdown().unwrap();
    }
}

// =============================================================================
// Log Shape
// =============================================================================

#[test]
fn test_deletes_shrink_the_log() {
    let (temp, service) = setup_service();

    for i in 0..20 {
        service.put(&format!("key{}", i), "some-value").unwrap();
    }
    service.shutdown().unwrap();
    let full_len = fs::metadata(temp.path().join("tx.log")).unwrap().len();

    let service = KeyValueService::bootstrap(&config_for(&temp)).unwrap();
    for i in 0..15 {
        service.delete(&format!("key{}", i)).unwrap();
    }
    service.shutdown().unwrap();
    let compacted_len = fs::metadata(temp.path().join("tx.log")).unwrap().len();

    assert!(compacted_len < full_len);

    // What's left is exactly the five undeleted keys.
    let service = KeyValueService::bootstrap(&config_for(&temp)).unwrap();
    for i in 15..20 {
        assert_eq!(service.get(&format!("key{}", i)).unwrap(), "some-value");
    }
    for i in 0..15 {
        assert!(matches!(
            service.get(&format!("key{}", i)),
            Err(LedgerError::KeyNotFound)
        ));
    }
    service.shutdown().unwrap();
}

#[test]
fn test_reads_are_not_logged() {
    let (temp, service) = setup_service();

    service.put("k", "v").unwrap();
    for _ in 0..50 {
        service.get("k").unwrap();
    }
    service.shutdown().unwrap();

    let contents = fs::read_to_string(temp.path().join("tx.log")).unwrap();
    assert_eq!(contents.lines().count(), 1);
}

// =============================================================================
// Concurrent Use
// =============================================================================

#[test]
fn test_concurrent_clients() {
    let (_temp, service) = setup_service();
    let service = Arc::new(service);

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                for i in 0..25 {
                    service
                        .put(&format!("writer{}", t), &format!("v{}", i))
                        .unwrap();
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                for t in 0..4 {
                    // Key may not exist yet; both outcomes are fine.
                    let _ = service.get(&format!("writer{}", t));
                }
            })
        })
        .collect();

    for thread in writers.into_iter().chain(readers) {
        thread.join().unwrap();
    }

    for t in 0..4 {
        assert_eq!(service.get(&format!("writer{}", t)).unwrap(), "v24");
    }

    Arc::try_unwrap(service)
        .ok()
        .expect("all clients done")
        .shutdown()
        .unwrap();
}
