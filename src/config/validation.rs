//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (rates, status codes, timeouts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SidecarConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::StatusCode;

use crate::config::schema::SidecarConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("log.dir must not be empty")]
    EmptyLogDir,

    #[error("log.file_name must be a plain file name, got {0:?}")]
    InvalidFileName(String),

    #[error("fault_injection.rate must be within [0, 1], got {0}")]
    FaultRateOutOfRange(f64),

    #[error("fault_injection.status {0} is not a valid HTTP status")]
    InvalidFaultStatus(u16),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &SidecarConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.log.dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyLogDir);
    }

    let name = &config.log.file_name;
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        errors.push(ValidationError::InvalidFileName(name.clone()));
    }

    let rate = config.fault_injection.rate;
    if !(0.0..=1.0).contains(&rate) {
        errors.push(ValidationError::FaultRateOutOfRange(rate));
    }

    if StatusCode::from_u16(config.fault_injection.status).is_err() {
        errors.push(ValidationError::InvalidFaultStatus(config.fault_injection.status));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&SidecarConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = SidecarConfig::default();
        config.log.dir = PathBuf::new();
        config.log.file_name = "../app.log".to_string();
        config.fault_injection.rate = 1.5;
        config.fault_injection.status = 42;
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyLogDir,
                ValidationError::InvalidFileName("../app.log".to_string()),
                ValidationError::FaultRateOutOfRange(1.5),
                ValidationError::InvalidFaultStatus(42),
                ValidationError::ZeroRequestTimeout,
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = SidecarConfig::default();
        config.observability.metrics_address = "not-an-address".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress(
                "not-an-address".to_string()
            )])
        );
    }
}
