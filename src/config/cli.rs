//! Command line and environment overrides.
//!
//! Precedence, lowest first: built-in defaults, TOML file, environment
//! variables, command line flags. clap resolves the last two.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::SidecarConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "proxy-sidecar")]
#[command(about = "HTTP sidecar that writes one JSON record per request", long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "SIDECAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long, env = "SIDECAR_HOST")]
    pub host: Option<IpAddr>,

    /// Listen port.
    #[arg(short, long, env = "SIDECAR_PORT")]
    pub port: Option<u16>,

    /// Directory for the log file set.
    #[arg(long, env = "SIDECAR_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Name of the active log file.
    #[arg(long, env = "SIDECAR_LOG_FILE")]
    pub log_file: Option<String>,

    /// Rotation threshold in bytes.
    #[arg(long, env = "SIDECAR_MAX_BYTES")]
    pub max_bytes: Option<u64>,

    /// Number of rotated files to keep.
    #[arg(long, env = "SIDECAR_BACKUP_COUNT")]
    pub backup_count: Option<usize>,

    /// Take client_ip from X-Forwarded-For.
    #[arg(long, env = "SIDECAR_TRUST_FORWARDED_FOR")]
    pub trust_forwarded_for: bool,

    /// Enable fault injection with this failure probability.
    #[arg(long, env = "SIDECAR_FAULT_INJECTION_RATE")]
    pub fault_injection_rate: Option<f64>,
}

impl Cli {
    /// Resolve the effective configuration.
    pub fn load(&self) -> Result<SidecarConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SidecarConfig::default(),
        };

        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;

        Ok(config)
    }

    fn apply(&self, config: &mut SidecarConfig) {
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(dir) = &self.log_dir {
            config.log.dir = dir.clone();
        }
        if let Some(file) = &self.log_file {
            config.log.file_name = file.clone();
        }
        if let Some(max_bytes) = self.max_bytes {
            config.log.max_bytes = max_bytes;
        }
        if let Some(backup_count) = self.backup_count {
            config.log.backup_count = backup_count;
        }
        if self.trust_forwarded_for {
            config.client_ip.trust_forwarded_for = true;
        }
        if let Some(rate) = self.fault_injection_rate {
            config.fault_injection.enabled = true;
            config.fault_injection.rate = rate;
        }
    }
}
