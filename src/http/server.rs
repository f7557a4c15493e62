//! HTTP server setup and the proxy endpoint.
//!
//! # Responsibilities
//! - Create Axum Router with the `/proxy` handler
//! - Wire up middleware (tracing, timeout)
//! - Bind server to listener with peer address info
//! - Write one record per request and answer `OK`
//! - Optional fault injection

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::SidecarConfig;
use crate::http::request::client_ip;
use crate::observability::metrics;
use crate::resilience::FaultInjector;
use crate::sink::{LogRecord, LogSink};

/// Path of the single endpoint.
pub const PROXY_PATH: &str = "/proxy";

/// Body of every successful response.
pub const OK_BODY: &str = "OK";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn LogSink>,
    pub logger_name: Arc<str>,
    pub trust_forwarded_for: bool,
    pub faults: FaultInjector,
}

/// HTTP server for the sidecar.
pub struct SidecarServer {
    router: Router,
}

impl SidecarServer {
    /// Create a server writing its records to `sink`.
    pub fn new(config: SidecarConfig, sink: Arc<dyn LogSink>) -> Self {
        let faults = FaultInjector::new(&config.fault_injection);
        if faults.is_enabled() {
            tracing::warn!(
                rate = config.fault_injection.rate,
                delay_ms = config.fault_injection.delay_ms,
                status = config.fault_injection.status,
                "Fault injection enabled"
            );
        }

        let state = AppState {
            sink,
            logger_name: Arc::from(config.log.logger_name.as_str()),
            trust_forwarded_for: config.client_ip.trust_forwarded_for,
            faults,
        };

        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SidecarConfig, state: AppState) -> Router {
        Router::new()
            .route(PROXY_PATH, any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving requests in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Record the call and answer `OK`.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();

    if state.faults.should_inject() {
        tokio::time::sleep(state.faults.delay()).await;
        let status = state.faults.status();
        tracing::info!(method = %method, status = %status, "Injected fault");
        metrics::record_request(method.as_str(), status.as_u16(), start_time);
        return status.into_response();
    }

    let client_ip = client_ip(&headers, peer, state.trust_forwarded_for);
    let record = LogRecord::proxy_call(&*state.logger_name, uri.path(), method.as_str(), client_ip);

    // Runs to completion on the blocking pool even if this future is dropped,
    // so a timed-out request never leaves a partial record.
    let sink = state.sink.clone();
    let written = tokio::task::spawn_blocking(move || sink.append(&record)).await;

    let status = match written {
        Ok(Ok(())) => {
            tracing::debug!(method = %method, path = %uri.path(), "Record written");
            StatusCode::OK
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, method = %method, path = %uri.path(), "Failed to write record");
            metrics::record_sink_failure();
            StatusCode::INTERNAL_SERVER_ERROR
        }
        Err(e) => {
            tracing::error!(error = %e, "Record writer task failed");
            metrics::record_sink_failure();
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    metrics::record_request(method.as_str(), status.as_u16(), start_time);

    if status.is_success() {
        (status, OK_BODY).into_response()
    } else {
        (status, "Log write failed").into_response()
    }
}
