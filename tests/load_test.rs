//! Load testing for the sidecar: concurrent writers across rotations.

use std::time::{Duration, Instant};

use tempfile::TempDir;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_never_split_records() {
    let dir = TempDir::new().unwrap();
    // Small files so the run crosses many rotations.
    let sidecar = common::start_sidecar(dir.path(), |config| {
        config.log.max_bytes = 4 * 1024;
        config.log.backup_count = 5;
    })
    .await;

    let concurrency = 20;
    let requests_per_task = 25;
    let client = common::client();
    let start = Instant::now();

    let mut handles = Vec::new();
    for task in 0..concurrency {
        let client = client.clone();
        let base = sidecar.url("/proxy");
        handles.push(tokio::spawn(async move {
            let mut ok = 0;
            for n in 0..requests_per_task {
                let res = client
                    .post(format!("{base}?task={task}&n={n}"))
                    .send()
                    .await
                    .unwrap();
                assert_eq!(res.status(), 200);
                assert_eq!(res.text().await.unwrap(), "OK");
                ok += 1;
            }
            ok
        }));
    }

    let mut total_ok = 0;
    for handle in handles {
        total_ok += handle.await.unwrap();
    }
    let elapsed = start.elapsed();

    println!(
        "{} requests in {:?} ({:.0} req/s)",
        total_ok,
        elapsed,
        total_ok as f64 / elapsed.as_secs_f64()
    );
    assert_eq!(total_ok, concurrency * requests_per_task);
    assert!(elapsed < Duration::from_secs(60));

    // Every retained line parses on its own and carries the full field set.
    let records = common::read_all_records(&sidecar.log_dir);
    assert!(!records.is_empty());
    for record in &records {
        assert_eq!(record.as_object().unwrap().len(), 7);
        assert_eq!(record["method"], "POST");
        assert_eq!(record["path"], "/proxy");
    }

    assert!(common::file_count(&sidecar.log_dir) <= 6);
    assert!(sidecar.log_dir.join("app.log.5").exists());
    assert!(!sidecar.log_dir.join("app.log.6").exists());

    for entry in std::fs::read_dir(&sidecar.log_dir).unwrap() {
        let len = entry.unwrap().metadata().unwrap().len();
        assert!(len <= 4 * 1024, "file exceeded rotation threshold: {len}");
    }
}
