//! HTTP logging sidecar library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod sink;

pub use config::SidecarConfig;
pub use http::SidecarServer;
pub use lifecycle::Shutdown;
pub use sink::{LogRecord, LogSink, RotatingFileSink, RotationPolicy};
