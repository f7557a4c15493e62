//! Probabilistic fault injection.
//!
//! When enabled, a fraction of requests is held for a fixed delay and then
//! answered with a failure status instead of being logged.

use std::time::Duration;

use axum::http::StatusCode;
use rand::Rng;

use crate::config::FaultInjectionConfig;

/// Decides whether a request should be failed on purpose.
#[derive(Debug, Clone)]
pub struct FaultInjector {
    enabled: bool,
    rate: f64,
    delay: Duration,
    status: StatusCode,
}

impl FaultInjector {
    pub fn new(config: &FaultInjectionConfig) -> Self {
        Self {
            enabled: config.enabled,
            rate: if config.rate.is_nan() { 0.0 } else { config.rate.clamp(0.0, 1.0) },
            delay: Duration::from_millis(config.delay_ms),
            status: StatusCode::from_u16(config.status).unwrap_or(StatusCode::GATEWAY_TIMEOUT),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Roll the dice for one request.
    pub fn should_inject(&self) -> bool {
        self.enabled && rand::thread_rng().gen_bool(self.rate)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}
