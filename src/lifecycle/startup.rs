//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the record sink (fatal if the log directory is unusable)
//! - Start the optional metrics exporter
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::SidecarConfig;
use crate::http::SidecarServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::sink::{RotatingFileSink, RotationPolicy, SinkError};

/// Fatal errors raised before the sidecar starts serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("log sink unavailable: {0}")]
    Sink(#[from] SinkError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bring the sidecar up and serve until SIGINT/SIGTERM.
pub async fn run(config: SidecarConfig) -> Result<(), StartupError> {
    let sink = RotatingFileSink::open(RotationPolicy::from(&config.log))?;

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let addr = config.listener.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    tracing::info!(
        address = %addr,
        log_dir = %config.log.dir.display(),
        max_bytes = config.log.max_bytes,
        backup_count = config.log.backup_count,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let signals = shutdown.trigger_on_signal();

    let server = SidecarServer::new(config, Arc::new(sink));
    let result = server.run(listener, shutdown.subscribe()).await;
    signals.abort();

    result.map_err(StartupError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_log_dir_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = SidecarConfig::default();
        config.log.dir = dir.path().join("missing");
        config.listener.port = 0;

        let err = run(config).await.unwrap_err();
        assert!(matches!(err, StartupError::Sink(_)));
    }
}
