//! Shared utilities for integration and load testing.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use proxy_sidecar::config::SidecarConfig;
use proxy_sidecar::http::SidecarServer;
use proxy_sidecar::lifecycle::Shutdown;
use proxy_sidecar::sink::{RotatingFileSink, RotationPolicy};
use tokio::net::TcpListener;

/// A sidecar serving on an ephemeral local port.
pub struct TestSidecar {
    pub addr: SocketAddr,
    pub log_dir: PathBuf,
    pub shutdown: Shutdown,
}

impl TestSidecar {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestSidecar {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a sidecar writing to `log_dir` with the given config tweaks.
pub async fn start_sidecar<F>(log_dir: &Path, configure: F) -> TestSidecar
where
    F: FnOnce(&mut SidecarConfig),
{
    let mut config = SidecarConfig::default();
    config.log.dir = log_dir.to_path_buf();
    config.log.sync = false;
    configure(&mut config);

    let sink = RotatingFileSink::open(RotationPolicy::from(&config.log)).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = SidecarServer::new(config, Arc::new(sink));
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestSidecar {
        addr,
        log_dir: log_dir.to_path_buf(),
        shutdown,
    }
}

/// Non-pooled client so every request is a fresh connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Parse every line of every file in `dir`.
#[allow(dead_code)]
pub fn read_all_records(dir: &Path) -> Vec<serde_json::Value> {
    let mut records = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let content = fs::read_to_string(entry.unwrap().path()).unwrap();
        for line in content.lines() {
            records.push(serde_json::from_str(line).expect("every line is a complete record"));
        }
    }
    records
}

/// Number of files in `dir`.
#[allow(dead_code)]
pub fn file_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}
