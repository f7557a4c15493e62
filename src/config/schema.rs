//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sidecar.
//! All types derive Serde traits for deserialization from config files.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the sidecar.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SidecarConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Record sink and rotation settings.
    pub log: LogConfig,

    /// How the client address of a record is determined.
    pub client_ip: ClientIpConfig,

    /// Synthetic failure settings.
    pub fault_injection: FaultInjectionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: IpAddr,

    /// Listen port.
    pub port: u16,
}

impl ListenerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 9000,
        }
    }
}

/// Record sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory holding the log file set. Must exist at startup.
    pub dir: PathBuf,

    /// Name of the active log file; backups append `.1`, `.2`, ...
    pub file_name: String,

    /// Rotation threshold in bytes (default 5 MiB).
    pub max_bytes: u64,

    /// Number of rotated files to keep.
    pub backup_count: usize,

    /// Value of the `name` field in every record.
    pub logger_name: String,

    /// Force records to storage (`fdatasync`) before responding.
    pub sync: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/var/log/test2"),
            file_name: "app.log".to_string(),
            max_bytes: 5 * 1024 * 1024,
            backup_count: 5,
            logger_name: "proxy".to_string(),
            sync: true,
        }
    }
}

/// Client address resolution.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientIpConfig {
    /// Use the first `X-Forwarded-For` entry instead of the peer address.
    pub trust_forwarded_for: bool,
}

/// Fault injection: delay then fail a fraction of requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FaultInjectionConfig {
    /// Master switch. Off unless explicitly enabled.
    pub enabled: bool,

    /// Probability (0.0 - 1.0) that a request is failed.
    pub rate: f64,

    /// Delay before the failure response, in milliseconds.
    pub delay_ms: u64,

    /// Status code of the failure response.
    pub status: u16,
}

impl Default for FaultInjectionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate: 0.2,
            delay_ms: 3000,
            status: 504,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Diagnostic log level used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit diagnostic output as JSON instead of text.
    pub json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9100".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = SidecarConfig::default();
        assert_eq!(config.listener.socket_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.log.dir, PathBuf::from("/var/log/test2"));
        assert_eq!(config.log.file_name, "app.log");
        assert_eq!(config.log.max_bytes, 5_242_880);
        assert_eq!(config.log.backup_count, 5);
        assert!(!config.fault_injection.enabled);
        assert!(!config.client_ip.trust_forwarded_for);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SidecarConfig = toml::from_str(
            r#"
            [listener]
            port = 9100

            [log]
            dir = "/tmp/sidecar"
            backup_count = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 9100);
        assert_eq!(config.listener.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.log.dir, PathBuf::from("/tmp/sidecar"));
        assert_eq!(config.log.backup_count, 2);
        assert_eq!(config.log.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.fault_injection.status, 504);
    }
}
