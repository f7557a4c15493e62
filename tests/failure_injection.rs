//! Failure injection tests for the sidecar.

use std::fs;
use std::time::{Duration, Instant};

use tempfile::TempDir;

mod common;

#[tokio::test]
async fn test_removed_log_dir_returns_server_error() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("logs");
    fs::create_dir(&log_dir).unwrap();

    // Default rotation threshold, so no rotation happens between requests.
    let sidecar = common::start_sidecar(&log_dir, |_| {}).await;
    let client = common::client();

    let res = client.get(sidecar.url("/proxy")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    fs::remove_dir_all(&log_dir).unwrap();

    let res = client.get(sidecar.url("/proxy")).send().await.unwrap();
    assert!(res.status().is_server_error(), "got {}", res.status());
    assert_ne!(res.text().await.unwrap(), "OK");

    // Failure is request scoped: the sidecar keeps serving once the
    // directory is back.
    fs::create_dir(&log_dir).unwrap();
    let res = client.get(sidecar.url("/proxy")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(common::read_all_records(&log_dir).len(), 1);
}

#[tokio::test]
async fn test_removed_log_dir_after_rotation_returns_server_error() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("logs");
    fs::create_dir(&log_dir).unwrap();

    // One record per file, so every request after the first rotates.
    let sidecar = common::start_sidecar(&log_dir, |config| {
        config.log.max_bytes = 1;
    })
    .await;
    let client = common::client();

    let res = client.get(sidecar.url("/proxy")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    fs::remove_dir_all(&log_dir).unwrap();

    let res = client.get(sidecar.url("/proxy")).send().await.unwrap();
    assert!(res.status().is_server_error(), "got {}", res.status());
}

#[tokio::test]
async fn test_fault_injection_delays_and_fails() {
    let dir = TempDir::new().unwrap();
    let sidecar = common::start_sidecar(dir.path(), |config| {
        config.fault_injection.enabled = true;
        config.fault_injection.rate = 1.0;
        config.fault_injection.delay_ms = 200;
    })
    .await;

    let start = Instant::now();
    let res = common::client().get(sidecar.url("/proxy")).send().await.unwrap();

    assert_eq!(res.status(), 504);
    assert!(start.elapsed() >= Duration::from_millis(200));
    assert!(common::read_all_records(&sidecar.log_dir).is_empty());
}

#[tokio::test]
async fn test_fault_injection_off_by_default() {
    let dir = TempDir::new().unwrap();
    let sidecar = common::start_sidecar(dir.path(), |_| {}).await;
    let client = common::client();

    for _ in 0..50 {
        let res = client.get(sidecar.url("/proxy")).send().await.unwrap();
        assert_eq!(res.status(), 200);
    }
    assert_eq!(common::read_all_records(&sidecar.log_dir).len(), 50);
}
